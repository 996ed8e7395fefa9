// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::entry::ZipEntry;
use crate::read::cd_record;
use crate::spec::consts::NON_ZIP64_MAX_SIZE;
use crate::spec::extra_field::{get_zip64_extra_field, ExtraFieldAsBytes};
use crate::write::central_directory_record;
use crate::{Compression, ZipEntryBuilder};

use std::io::Cursor;

fn entry_of(size: u64, offset: u64) -> ZipEntry {
    let mut entry = ZipEntryBuilder::new("large.bin".into(), Compression::Stored)
        .crc32(0xDEADBEEF)
        .uncompressed_size(size)
        .compressed_size(size)
        .build();
    entry.header_offset = Some(offset);
    entry
}

/// Serialises a central directory record (without its signature) and reads it back.
fn round_trip(entry: &ZipEntry, force_zip64: bool) -> ZipEntry {
    let (header, extra_fields) = central_directory_record(entry, force_zip64).unwrap();

    let mut data = header.as_slice().to_vec();
    data.extend_from_slice(entry.filename().as_bytes());
    data.extend(extra_fields.as_bytes());
    data.extend_from_slice(entry.comment().as_bytes());

    cd_record(&mut Cursor::new(data), None).unwrap()
}

#[test]
fn below_threshold_is_legacy() {
    let entry = entry_of(0xFFFF_FFFE, 0xFFFF_FFFE);
    let (header, extra_fields) = central_directory_record(&entry, false).unwrap();

    assert_eq!(header.uncompressed_size, 0xFFFF_FFFE);
    assert_eq!(header.compressed_size, 0xFFFF_FFFE);
    assert_eq!(header.lh_offset, 0xFFFF_FFFE);
    assert!(get_zip64_extra_field(&extra_fields).is_none());

    let read = round_trip(&entry, false);
    assert_eq!(read.uncompressed_size(), Some(0xFFFF_FFFE));
    assert_eq!(read.header_offset(), Some(0xFFFF_FFFE));
}

#[test]
fn at_threshold_is_extended() {
    let entry = entry_of(0xFFFF_FFFF, 10);
    let (header, extra_fields) = central_directory_record(&entry, false).unwrap();

    assert_eq!(header.uncompressed_size, NON_ZIP64_MAX_SIZE);
    assert_eq!(header.compressed_size, NON_ZIP64_MAX_SIZE);
    assert_eq!(header.lh_offset, 10);

    let zip64 = get_zip64_extra_field(&extra_fields).unwrap();
    assert_eq!(zip64.uncompressed_size, Some(0xFFFF_FFFF));
    assert_eq!(zip64.compressed_size, Some(0xFFFF_FFFF));
    assert_eq!(zip64.relative_header_offset, None);

    let read = round_trip(&entry, false);
    assert_eq!(read.uncompressed_size(), Some(0xFFFF_FFFF));
    assert_eq!(read.compressed_size(), Some(0xFFFF_FFFF));
    assert_eq!(read.header_offset(), Some(10));
    assert_eq!(read.crc32(), Some(0xDEADBEEF));
}

#[test]
fn offset_alone_is_extended() {
    let entry = entry_of(12, 0x1_0000_0000);
    let (header, _) = central_directory_record(&entry, false).unwrap();
    assert_eq!(header.uncompressed_size, 12);
    assert_eq!(header.lh_offset, NON_ZIP64_MAX_SIZE);

    let read = round_trip(&entry, false);
    assert_eq!(read.uncompressed_size(), Some(12));
    assert_eq!(read.header_offset(), Some(0x1_0000_0000));
}

#[test]
fn forced_is_extended() {
    let entry = entry_of(12, 0);
    let (header, extra_fields) = central_directory_record(&entry, true).unwrap();
    assert_eq!(header.uncompressed_size, NON_ZIP64_MAX_SIZE);
    assert!(get_zip64_extra_field(&extra_fields).is_some());

    let read = round_trip(&entry, true);
    assert_eq!(read.uncompressed_size(), Some(12));
    assert_eq!(read.header_offset(), Some(0));
}
