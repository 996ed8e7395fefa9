// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::read::{OffsetMapper, ZipArchive};
use crate::tests::{init_logger, payload};
use crate::write::ZipFileWriter;
use crate::{Compression, ZipEntryBuilder};

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;

const TEST_FILENAME: &str = "foo.bar";
const TEST_FILE_CONTENT: &str = "Hello World!";

fn forced_archive() -> Vec<u8> {
    let mut writer = ZipFileWriter::new(Vec::new()).force_zip64();
    let builder = ZipEntryBuilder::new(TEST_FILENAME.into(), Compression::Stored);
    writer.write_entry_whole(builder, TEST_FILE_CONTENT.as_bytes()).unwrap();
    let builder = ZipEntryBuilder::new("deflated.txt".into(), Compression::Deflate);
    writer.write_entry_whole(builder, &payload(4096)).unwrap();
    writer.close().unwrap()
}

/// Tests that a forced Zip64 archive is located through its Zip64 trailer.
#[test]
fn test_read_forced_zip64() {
    init_logger();

    let archive = ZipArchive::open(forced_archive()).unwrap();
    assert!(archive.file().zip64());
    assert_eq!(archive.file().mapper(), OffsetMapper::Identity);
    assert_eq!(archive.len(), 2);

    let mut reader = archive.reader(TEST_FILENAME).unwrap();
    let mut read = String::new();
    reader.read_to_string(&mut read).unwrap();
    reader.close().unwrap();
    assert_eq!(read, TEST_FILE_CONTENT);

    let mut data = Vec::new();
    archive.reader("deflated.txt").unwrap().read_to_end_checked(&mut data).unwrap();
    assert_eq!(data, payload(4096));
}

/// Tests that the zip crate reads a forced Zip64 archive we wrote.
#[test]
fn test_write_forced_zip64_read_by_zip() {
    init_logger();

    let mut archive = zip::ZipArchive::new(Cursor::new(forced_archive())).unwrap();
    let mut file = archive.by_name(TEST_FILENAME).unwrap();
    let mut read = String::new();
    file.read_to_string(&mut read).unwrap();
    assert_eq!(read, TEST_FILE_CONTENT);
}

/// Tests that a Zip64 entry written by the zip crate is read correctly.
#[test]
fn test_read_zip64_from_zip() {
    init_logger();

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored).large_file(true);
    writer.start_file(TEST_FILENAME, options).unwrap();
    writer.write_all(TEST_FILE_CONTENT.as_bytes()).unwrap();
    let data = writer.finish().unwrap().into_inner();

    let archive = ZipArchive::open(data).unwrap();
    let mut read = Vec::new();
    archive.reader(TEST_FILENAME).unwrap().read_to_end_checked(&mut read).unwrap();
    assert_eq!(read, TEST_FILE_CONTENT.as_bytes());
}

/// Tests that a Zip64 archive moved behind a preamble resolves through a shifted mapper.
#[test]
fn test_read_zip64_behind_preamble() {
    init_logger();

    let mut data = vec![0x55; 1000];
    data.extend(forced_archive());

    let archive = ZipArchive::open(data).unwrap();
    assert!(archive.file().zip64());
    assert_eq!(archive.file().mapper(), OffsetMapper::Shifted(1000));
    assert_eq!(archive.preamble(), 1000);

    let mut read = Vec::new();
    archive.reader(TEST_FILENAME).unwrap().read_to_end_checked(&mut read).unwrap();
    assert_eq!(read, TEST_FILE_CONTENT.as_bytes());
}
