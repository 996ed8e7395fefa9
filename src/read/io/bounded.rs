// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::read::source::ReadAt;

use std::io::{self, Read};

/// A reader over a fixed byte range of a source.
pub(crate) struct BoundedReader<S> {
    source: S,
    position: u64,
    remaining: u64,
}

impl<S: ReadAt> BoundedReader<S> {
    pub(crate) fn new(source: S, position: u64, length: u64) -> Self {
        Self { source, position, remaining: length }
    }
}

impl<S: ReadAt> Read for BoundedReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let wanted = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let read = self.source.read_at(&mut buf[..wanted], self.position)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "entry data extends past the end of the source"));
        }

        self.position += read as u64;
        self.remaining -= read as u64;
        Ok(read)
    }
}
