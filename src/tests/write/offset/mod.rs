// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::write::io::offset::OffsetWriter;

use std::io::{IoSlice, Write};

#[test]
fn basic() {
    let mut writer = OffsetWriter::new(Vec::new());
    assert_eq!(writer.offset(), 0);

    writer.write_all(b"Foo. Bar. Foo. Bar.").expect("failed to write data");
    assert_eq!(writer.offset(), 19);

    writer.write_all(b"Foo. Foo.").expect("failed to write data");
    assert_eq!(writer.offset(), 28);

    writer.write_all(b"Bar. Bar.").expect("failed to write data");
    assert_eq!(writer.offset(), 37);

    assert_eq!(writer.into_inner().len(), 37);
}

#[test]
fn vectored() {
    let mut writer = OffsetWriter::new(Vec::new());
    let written = writer.write_vectored(&[IoSlice::new(b"abc"), IoSlice::new(b"defg")]).expect("failed to write data");

    assert_eq!(writer.offset(), written as u64);
    assert_eq!(&writer.inner_mut()[..written], &b"abcdefg"[..written]);
}
