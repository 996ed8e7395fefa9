// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod read;
pub(crate) mod spec;
pub(crate) mod write;

use crate::write::ZipFileWriter;
use crate::{Compression, ZipEntryBuilder};

/// Initialise the logger for tests; repeated calls are ignored.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes an in-memory archive containing the given entries.
pub(crate) fn archive_of(entries: &[(&str, Compression, &[u8])]) -> Vec<u8> {
    let mut writer = ZipFileWriter::new(Vec::new());
    for (name, compression, data) in entries {
        let builder = ZipEntryBuilder::new((*name).into(), *compression);
        writer.write_entry_whole(builder, data).expect("failed to write entry");
    }
    writer.close().expect("failed to close writer")
}

/// Returns a highly compressible payload of the given length.
pub(crate) fn payload(length: usize) -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".iter().copied().cycle().take(length).collect()
}
