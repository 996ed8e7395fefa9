// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod offset;
pub(crate) mod zip64;

use crate::error::ZipError;
use crate::read::ZipArchive;
use crate::tests::{init_logger, payload};
use crate::write::ZipFileWriter;
use crate::{Compression, ZipEntryBuilder};

use std::io::Write;

#[test]
fn stored_entry_requires_metadata() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let result = writer.begin_entry(ZipEntryBuilder::new("a".into(), Compression::Stored), false);
    assert!(matches!(result, Err(ZipError::MissingEntryMetadata { field: "CRC32", .. })));
}

#[test]
fn stored_entry_checked_at_close() {
    let data = b"declared content";
    let builder = ZipEntryBuilder::new("a".into(), Compression::Stored)
        .crc32(crc32fast::hash(data))
        .uncompressed_size(data.len() as u64)
        .compressed_size(data.len() as u64);

    let mut writer = ZipFileWriter::new(Vec::new());
    writer.begin_entry(builder, false).unwrap();
    writer.write_all(b"short").unwrap();
    let result = writer.close_entry();
    assert!(matches!(result, Err(ZipError::EntryMetadataMismatch { field: "compressed size", .. })));
}

#[test]
fn duplicate_names() {
    init_logger();

    let mut writer = ZipFileWriter::new(Vec::new());
    writer.write_entry_whole(ZipEntryBuilder::new("a".into(), Compression::Stored), b"first").unwrap();
    writer.write_entry_whole(ZipEntryBuilder::new("a".into(), Compression::Stored), b"second").unwrap();
    let data = writer.close().unwrap();

    // The later entry shadows the earlier one.
    let archive = ZipArchive::open(data).unwrap();
    assert_eq!(archive.len(), 1);
    let mut read = Vec::new();
    archive.reader("a").unwrap().read_to_end_checked(&mut read).unwrap();
    assert_eq!(read, b"second");

    let mut writer = ZipFileWriter::new(Vec::new()).strict_names();
    writer.write_entry_whole(ZipEntryBuilder::new("a".into(), Compression::Stored), b"first").unwrap();
    let result = writer.write_entry_whole(ZipEntryBuilder::new("a".into(), Compression::Stored), b"second");
    assert!(matches!(result, Err(ZipError::DuplicateEntry(_))));
}

#[test]
fn write_without_entry() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let result = writer.write_all(b"data").map_err(ZipError::from);
    assert!(matches!(result, Err(ZipError::NoActiveEntry)));
}

#[test]
fn finish_is_idempotent() {
    let mut writer = ZipFileWriter::new(Vec::new());
    writer.write_entry_whole(ZipEntryBuilder::new("a".into(), Compression::Deflate), &payload(100)).unwrap();
    writer.finish().unwrap();
    let length = writer.inner_mut().len();

    writer.finish().unwrap();
    assert_eq!(writer.inner_mut().len(), length);

    let result = writer.begin_entry(ZipEntryBuilder::new("b".into(), Compression::Deflate), false);
    assert!(matches!(result, Err(ZipError::WriterFinished)));
}

#[test]
fn abandoned_entry_not_recorded() {
    let mut writer = ZipFileWriter::new(Vec::new());
    writer.begin_entry(ZipEntryBuilder::new("gone".into(), Compression::Deflate), false).unwrap();
    writer.write_all(b"partial").unwrap();
    writer.abandon_entry().unwrap();
    writer.write_entry_whole(ZipEntryBuilder::new("kept".into(), Compression::Stored), b"kept").unwrap();
    assert_eq!(writer.entries().len(), 1);

    let archive = ZipArchive::open(writer.close().unwrap()).unwrap();
    assert!(archive.entry("gone").is_none());
    assert!(archive.entry("kept").is_some());
}

/// Returns the extra field length recorded in the first local file header.
fn first_lfh_extra_length(data: &[u8]) -> u16 {
    u16::from_le_bytes([data[28], data[29]])
}

#[test]
fn streamed_entry_reserves_zip64_field_only_when_forced() {
    init_logger();

    for force in [false, true] {
        let mut writer = ZipFileWriter::new(Vec::new());
        if force {
            writer = writer.force_zip64();
        }
        writer.begin_entry(ZipEntryBuilder::new("streamed".into(), Compression::Deflate), false).unwrap();
        writer.write_all(&payload(4_000)).unwrap();
        writer.close_entry().unwrap();
        let data = writer.close().unwrap();

        // A Zip64 extended information field holding both sizes is 20 bytes long.
        assert_eq!(first_lfh_extra_length(&data), if force { 20 } else { 0 });

        let archive = ZipArchive::open(data).unwrap();
        let mut read = Vec::new();
        archive.reader("streamed").unwrap().read_to_end_checked(&mut read).unwrap();
        assert_eq!(read, payload(4_000));
    }
}
