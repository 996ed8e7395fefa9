// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::opts::ReadOptions;
use crate::read::ZipArchive;
use crate::string::{StringEncoding, ZipString};
use crate::tests::init_logger;
use crate::write::ZipFileWriter;
use crate::{Compression, ZipEntryBuilder};

/// Writes an archive whose single entry name is stored as Shift_JIS, without the UTF-8 flag.
fn shift_jis_archive(name: &str) -> (Vec<u8>, Vec<u8>) {
    let (encoded, _, unmappable) = encoding_rs::SHIFT_JIS.encode(name);
    assert!(!unmappable);
    let encoded = encoded.into_owned();

    let filename = ZipString::new(encoded.clone(), StringEncoding::Raw);
    let mut writer = ZipFileWriter::new(Vec::new());
    writer.write_entry_whole(ZipEntryBuilder::new(filename, Compression::Stored), b"content").unwrap();
    (writer.close().unwrap(), encoded)
}

#[test]
fn legacy_encoded_name_decoded() {
    init_logger();

    let (data, encoded) = shift_jis_archive("日本語.txt");
    let options = ReadOptions::new().legacy_encoding(encoding_rs::SHIFT_JIS);
    let archive = ZipArchive::open_with(data, &options).unwrap();

    let entry = archive.entry("日本語.txt").unwrap();
    assert!(!entry.flags().filename_unicode);
    assert_eq!(entry.filename().as_str().unwrap(), "日本語.txt");
    assert_eq!(entry.filename().alternative(), Some(encoded.as_slice()));

    let mut read = Vec::new();
    archive.reader("日本語.txt").unwrap().read_to_end_checked(&mut read).unwrap();
    assert_eq!(read, b"content");
}

#[test]
fn legacy_name_kept_raw_without_encoding() {
    let (data, encoded) = shift_jis_archive("日本語.txt");
    let archive = ZipArchive::open(data).unwrap();

    let entry = &archive.entries()[0];
    assert_eq!(entry.filename().encoding(), StringEncoding::Raw);
    assert_eq!(entry.filename().as_bytes(), encoded.as_slice());
    assert!(archive.entry("日本語.txt").is_none());
}
