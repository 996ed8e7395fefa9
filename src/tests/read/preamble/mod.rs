// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::opts::ReadOptions;
use crate::read::{OffsetMapper, ZipArchive};
use crate::tests::{archive_of, init_logger, payload};
use crate::Compression;

fn prefixed(preamble: usize) -> Vec<u8> {
    let mut data = vec![0xAA; preamble];
    data.extend(archive_of(&[
        ("stored.txt", Compression::Stored, b"stored content"),
        ("deflated.txt", Compression::Deflate, &payload(10_000)),
    ]));
    data
}

#[test]
fn preamble_length_reported() {
    init_logger();

    let archive = ZipArchive::open(prefixed(10_000)).unwrap();
    assert_eq!(archive.preamble(), 10_000);
    assert_eq!(archive.postamble(), 0);
    assert_eq!(archive.file().mapper(), OffsetMapper::Shifted(10_000));

    let mut data = Vec::new();
    archive.reader("deflated.txt").unwrap().read_to_end_checked(&mut data).unwrap();
    assert_eq!(data, payload(10_000));

    let mut data = Vec::new();
    archive.reader("stored.txt").unwrap().read_to_end_checked(&mut data).unwrap();
    assert_eq!(data, b"stored content");
}

#[test]
fn no_preamble_reported_as_zero() {
    let archive = ZipArchive::open(prefixed(0)).unwrap();
    assert_eq!(archive.preamble(), 0);
    assert_eq!(archive.file().mapper(), OffsetMapper::Identity);
}

#[test]
fn preamble_rejected_when_disallowed() {
    init_logger();

    let options = ReadOptions::new().allow_preamble(false);
    let result = ZipArchive::open_with(prefixed(10_000), &options);
    assert!(matches!(result, Err(ZipError::InvalidArchive(_))));

    assert!(ZipArchive::open_with(prefixed(0), &options).is_ok());
}

#[test]
fn postamble_within_search_distance() {
    let mut data = prefixed(0);
    data.extend_from_slice(&[0; 100]);

    let archive = ZipArchive::open(data).unwrap();
    assert_eq!(archive.postamble(), 100);
    assert_eq!(archive.len(), 2);
}
