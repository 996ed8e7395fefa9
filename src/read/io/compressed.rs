// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::read::io::inflate::InflateReader;

use std::io::{self, Read};

/// A wrapping reader which holds concrete types for all respective compression method readers.
pub(crate) enum CompressedReader<R> {
    Stored(R),
    Deflate(InflateReader<R>),
}

impl<R: Read> Read for CompressedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            CompressedReader::Stored(inner) => inner.read(buf),
            CompressedReader::Deflate(inner) => inner.read(buf),
        }
    }
}
