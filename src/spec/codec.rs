// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Little-endian fixed-width integer access over byte buffers.
//!
//! Every record in a ZIP file is a run of little-endian integers. Parsing goes through [`FieldReader`], which walks
//! a fixed-size array sequentially, and emission goes through [`array_push`].

/// Reads a little-endian u16 at the given index.
pub(crate) fn get_u16(buffer: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buffer[at], buffer[at + 1]])
}

/// Reads a little-endian u32 at the given index.
pub(crate) fn get_u32(buffer: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buffer[at], buffer[at + 1], buffer[at + 2], buffer[at + 3]])
}

/// Reads a little-endian u64 at the given index.
pub(crate) fn get_u64(buffer: &[u8], at: usize) -> u64 {
    let mut bytes = [0; 8];
    bytes.copy_from_slice(&buffer[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// A sequential reader of little-endian fields from a buffer whose length is known to cover every field read.
pub(crate) struct FieldReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub(crate) fn u16(&mut self) -> u16 {
        let value = get_u16(self.buffer, self.cursor);
        self.cursor += 2;
        value
    }

    pub(crate) fn u32(&mut self) -> u32 {
        let value = get_u32(self.buffer, self.cursor);
        self.cursor += 4;
        value
    }

    pub(crate) fn u64(&mut self) -> u64 {
        let value = get_u64(self.buffer, self.cursor);
        self.cursor += 8;
        value
    }

    /// Returns the number of bytes not yet consumed.
    pub(crate) fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }
}

/// Replace elements of an array at a given cursor index for use with a zero-initialised array.
macro_rules! array_push {
    ($arr:ident, $cursor:ident, $value:expr) => {{
        for entry in $value {
            $arr[$cursor] = entry;
            $cursor += 1;
        }
    }};
}

pub(crate) use array_push;
