// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::read::locator::{reverse_search_buffer, Locator};
use crate::read::ZipArchive;
use crate::opts::ReadOptions;
use crate::tests::{archive_of, init_logger};
use crate::write::ZipFileWriter;

#[test]
fn search_one_byte_test() {
    let buffer: &[u8] = &[0x0, 0x0, 0x0, 0x0, 0x0, 0x0];
    let signature: &[u8] = &[0x1];

    let matched = reverse_search_buffer(buffer, signature);
    assert!(matched.is_none());

    let buffer: &[u8] = &[0x2, 0x1, 0x0, 0x0, 0x1, 0x0];
    let signature: &[u8] = &[0x1];

    let matched = reverse_search_buffer(buffer, signature);
    assert_eq!(Some(4), matched);
}

#[test]
fn search_two_byte_test() {
    let buffer: &[u8] = &[0x2, 0x1, 0x0, 0x0, 0x0, 0x0];
    let signature: &[u8] = &[0x2, 0x1];

    let matched = reverse_search_buffer(buffer, signature);
    assert_eq!(Some(0), matched);
}

#[test]
fn search_shorter_than_signature_test() {
    assert!(reverse_search_buffer(&[0x50, 0x4b], &[0x50, 0x4b, 0x05, 0x06]).is_none());
}

#[test]
fn locator_empty_test() {
    let data = ZipFileWriter::new(Vec::new()).close().unwrap();
    assert_eq!(data.len(), 22);

    let mut locator = Locator::new(data.as_slice(), data.len() as u64, false);
    assert_eq!(locator.next_candidate().unwrap(), Some(0));
    assert_eq!(locator.next_candidate().unwrap(), None);
}

#[test]
fn locator_empty_max_comment_test() {
    let comment = "c".repeat(u16::MAX as usize);
    let data = ZipFileWriter::new(Vec::new()).comment(comment.clone().into()).close().unwrap();

    let mut locator = Locator::new(data.as_slice(), data.len() as u64, false);
    assert_eq!(locator.next_candidate().unwrap(), Some(0));

    let archive = ZipArchive::open(data).unwrap();
    assert_eq!(archive.comment().as_str().unwrap(), comment);
}

#[test]
fn locator_buffer_boundary_test() {
    // Place the signature so that it straddles the boundary between the first two buffers read.
    for comment_length in 2044..2052 {
        let comment = "c".repeat(comment_length);
        let data = ZipFileWriter::new(Vec::new()).comment(comment.into()).close().unwrap();

        let mut locator = Locator::new(data.as_slice(), data.len() as u64, false);
        assert_eq!(locator.next_candidate().unwrap(), Some(0), "comment length {comment_length}");
    }
}

#[test]
fn locator_skips_signature_in_comment_test() {
    init_logger();

    // A comment which itself looks like a trailer but whose declared comment overruns the data.
    let mut fake = Vec::new();
    fake.extend_from_slice(&crate::spec::consts::EOCDR_SIGNATURE.to_le_bytes());
    fake.extend_from_slice(&[0; 16]);
    fake.extend_from_slice(&0xFFFFu16.to_le_bytes());
    let comment = crate::string::ZipString::new(fake, crate::StringEncoding::Raw);

    let data = ZipFileWriter::new(Vec::new()).comment(comment).close().unwrap();
    let archive = ZipArchive::open(data).unwrap();
    assert!(archive.is_empty());
    assert_eq!(archive.postamble(), 0);
}

#[test]
fn postamble_requires_unbounded_search_test() {
    init_logger();

    let mut data = archive_of(&[("a.txt", crate::Compression::Stored, b"alpha")]);
    data.extend(std::iter::repeat(0u8).take(70_000));

    let result = ZipArchive::open(data.clone());
    assert!(matches!(result, Err(ZipError::UnableToLocateEOCDR)));

    let archive = ZipArchive::open_with(data, &ReadOptions::new().allow_postamble(true)).unwrap();
    assert_eq!(archive.postamble(), 70_000);
    assert!(archive.entry("a.txt").is_some());
}

#[test]
fn too_short_test() {
    let result = ZipArchive::open(Vec::new());
    assert!(matches!(result, Err(ZipError::UnableToLocateEOCDR)));

    let result = ZipArchive::open(vec![0u8; 21]);
    assert!(matches!(result, Err(ZipError::UnableToLocateEOCDR)));
}
