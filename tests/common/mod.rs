// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#![allow(dead_code)]

use mountzip::read::{ReadAt, ZipArchive};
use mountzip::write::ZipFileWriter;
use mountzip::{Compression, ZipEntryBuilder};

use std::io::Read;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generates the sample entries used across tests, keyed by name.
pub fn sample_data() -> Vec<(String, Vec<u8>)> {
    let alphabet: Vec<u8> = (b'a'..=b'z').cycle().take(26 * 40).collect();
    let reversed: Vec<u8> = alphabet.iter().rev().copied().collect();
    let forward: Vec<u8> = (0..2_000).flat_map(|n| format!("{n}\n").into_bytes()).collect();
    let noise: Vec<u8> = (0u32..50_000).map(|n| (n.wrapping_mul(2_654_435_761) >> 13) as u8).collect();

    vec![
        ("sample_data/alpha/front_to_back.txt".to_string(), alphabet),
        ("sample_data/alpha/back_to_front.txt".to_string(), reversed),
        ("sample_data/numeric/forward.txt".to_string(), forward),
        ("sample_data/noise.bin".to_string(), noise),
        ("sample_data/empty.txt".to_string(), Vec::new()),
        ("sample_data/ünïcödé.txt".to_string(), b"unicode name".to_vec()),
    ]
}

/// Writes the sample data into an in-memory archive, alternating between whole and streamed entries.
pub fn compress_to_mem(compression: Compression) -> Vec<u8> {
    let mut writer = ZipFileWriter::new(Vec::with_capacity(10_000));

    for (index, (name, content)) in sample_data().into_iter().enumerate() {
        let builder = ZipEntryBuilder::new(name.into(), compression);

        if index % 2 == 0 || compression == Compression::Stored {
            writer.write_entry_whole(builder, &content).unwrap();
        } else {
            writer.begin_entry(builder, false).unwrap();
            std::io::Write::write_all(&mut writer, &content).unwrap();
            writer.close_entry().unwrap();
        }
    }
    writer.close().unwrap()
}

/// Checks that every sample entry reads back from the archive unchanged.
pub fn check_decompress<S: ReadAt>(archive: &ZipArchive<S>) {
    for (name, expected) in sample_data() {
        let mut reader = archive.reader(&name).unwrap();
        let mut output = Vec::new();
        reader.read_to_end(&mut output).unwrap();
        reader.close().unwrap();
        assert_eq!(output, expected, "for {name}, expect zip data to match sample data");
    }
}
