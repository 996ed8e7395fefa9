// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::read::{check_entry_count, ZipArchive};
use crate::spec::consts::{SIGNATURE_LENGTH, ZIP64_EOCDL_LENGTH, ZIP64_EOCDR_LENGTH};
use crate::tests::read::{eocdr_field, eocdr_position};
use crate::tests::init_logger;
use crate::write::ZipFileWriter;
use crate::{Compression, ZipEntryBuilder};

/// Offsets of the entry count fields within the EOCDR, after its signature.
const EOCDR_ENTRIES_DISK: usize = 4;
const EOCDR_ENTRIES: usize = 6;

/// Offsets of the entry count fields within the Zip64 EOCDR, after its signature.
const ZIP64_ENTRIES_DISK: usize = 20;
const ZIP64_ENTRIES: usize = 28;

fn patch_u16(data: &mut [u8], at: usize, value: u16) {
    data[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn patch_u64(data: &mut [u8], at: usize, value: u64) {
    data[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn entry_count_rules() {
    assert!(check_entry_count(3, 3, true).is_ok());
    assert!(check_entry_count(3, 3, false).is_ok());
    assert!(check_entry_count(0, 65_536, false).is_ok());
    assert!(check_entry_count(1, 65_537, false).is_ok());
    assert!(check_entry_count(1, 131_073, false).is_ok());

    assert!(check_entry_count(1, 65_537, true).is_err());
    assert!(check_entry_count(2, 65_537, false).is_err());
    assert!(check_entry_count(5, 4, false).is_err());
}

/// Tests that an archive whose legacy entry count wrapped, and which carries no Zip64 trailer, is still read.
#[test]
fn wrapped_legacy_count() {
    init_logger();

    let total = 65_537usize;
    let mut writer = ZipFileWriter::new(Vec::new());
    for index in 0..total {
        let builder = ZipEntryBuilder::new(format!("{index}").into(), Compression::Stored);
        writer.write_entry_whole(builder, &[]).unwrap();
    }
    let mut data = writer.close().unwrap();

    // Strip the Zip64 trailer and write the count the way writers without Zip64 support would.
    let trailer_length = 2 * SIGNATURE_LENGTH + ZIP64_EOCDR_LENGTH + ZIP64_EOCDL_LENGTH;
    let eocdr = eocdr_position(&data);
    data.drain(eocdr - trailer_length..eocdr);

    let wrapped = (total % 65_536) as u16;
    let (disk_entries, entries) = (eocdr_field(&data, EOCDR_ENTRIES_DISK), eocdr_field(&data, EOCDR_ENTRIES));
    patch_u16(&mut data, disk_entries, wrapped);
    patch_u16(&mut data, entries, wrapped);

    let archive = ZipArchive::open(data.clone()).unwrap();
    assert!(!archive.file().zip64());
    assert_eq!(archive.len(), total);
    assert!(archive.entry("65536").is_some());

    let (disk_entries, entries) = (eocdr_field(&data, EOCDR_ENTRIES_DISK), eocdr_field(&data, EOCDR_ENTRIES));
    patch_u16(&mut data, disk_entries, wrapped + 1);
    patch_u16(&mut data, entries, wrapped + 1);
    let result = ZipArchive::open(data);
    assert!(matches!(result, Err(ZipError::EntryCountMismatch { declared: 2, actual: 65_537 })));
}

/// Tests that the Zip64 entry count must match exactly.
#[test]
fn zip64_count_mismatch() {
    init_logger();

    let mut writer = ZipFileWriter::new(Vec::new()).force_zip64();
    for name in ["a", "b"] {
        writer.write_entry_whole(ZipEntryBuilder::new(name.into(), Compression::Stored), name.as_bytes()).unwrap();
    }
    let mut data = writer.close().unwrap();
    assert!(ZipArchive::open(data.clone()).is_ok());

    let record = eocdr_position(&data) - (2 * SIGNATURE_LENGTH + ZIP64_EOCDR_LENGTH + ZIP64_EOCDL_LENGTH);
    patch_u64(&mut data, record + SIGNATURE_LENGTH + ZIP64_ENTRIES_DISK, 65_538);
    patch_u64(&mut data, record + SIGNATURE_LENGTH + ZIP64_ENTRIES, 65_538);

    let result = ZipArchive::open(data);
    assert!(matches!(result, Err(ZipError::EntryCountMismatch { declared: 65_538, actual: 2 })));
}
