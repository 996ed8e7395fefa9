// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::read::ZipArchive;
use crate::spec::consts::{CDH_LENGTH, SIGNATURE_LENGTH, ZIP64_EOCDL_LENGTH};
use crate::tests::read::{eocdr_field, eocdr_position};
use crate::tests::{archive_of, init_logger};
use crate::write::ZipFileWriter;
use crate::{Compression, ZipEntryBuilder};

/// The offset of the compression method within a central directory record, including its signature.
const CDH_COMPRESSION_OFFSET: usize = 10;
/// The offset of the EOCDR's disk number, relative to the end of its signature.
const EOCDR_DISK_NUMBER: usize = 0;
/// The offset of the Zip64 locator's total disk count, relative to the end of its signature.
const ZIP64_EOCDL_TOTAL_DISKS: usize = 12;

fn is_spanning_error(result: crate::error::Result<ZipArchive<Vec<u8>>>) -> bool {
    matches!(result, Err(ZipError::FeatureNotSupported(_)))
}

#[test]
fn unsupported_compression_method() {
    init_logger();

    let mut data = archive_of(&[("a.txt", Compression::Stored, b"content")]);
    let record = eocdr_position(&data) - (SIGNATURE_LENGTH + CDH_LENGTH + "a.txt".len());
    data[record + CDH_COMPRESSION_OFFSET..record + CDH_COMPRESSION_OFFSET + 2].copy_from_slice(&99u16.to_le_bytes());

    match ZipArchive::open(data) {
        Err(ZipError::Entry { name, source }) => {
            assert_eq!(name, "a.txt");
            assert!(matches!(*source, ZipError::CompressionNotSupported(99)));
        }
        other => panic!("expected an unsupported compression error, got {:?}", other.err()),
    }
}

#[test]
fn spanned_legacy_trailer_rejected() {
    init_logger();

    let mut data = archive_of(&[("a.txt", Compression::Stored, b"content")]);
    let disk = eocdr_field(&data, EOCDR_DISK_NUMBER);
    data[disk] = 1;

    assert!(is_spanning_error(ZipArchive::open(data)));
}

#[test]
fn spanned_zip64_locator_rejected() {
    init_logger();

    let mut writer = ZipFileWriter::new(Vec::new()).force_zip64();
    writer.write_entry_whole(ZipEntryBuilder::new("a.txt".into(), Compression::Stored), b"content").unwrap();
    let mut data = writer.close().unwrap();
    assert!(ZipArchive::open(data.clone()).unwrap().file().zip64());

    let locator = eocdr_position(&data) - (SIGNATURE_LENGTH + ZIP64_EOCDL_LENGTH);
    let disks = locator + SIGNATURE_LENGTH + ZIP64_EOCDL_TOTAL_DISKS;
    data[disks..disks + 4].copy_from_slice(&2u32.to_le_bytes());

    assert!(is_spanning_error(ZipArchive::open(data)));
}
