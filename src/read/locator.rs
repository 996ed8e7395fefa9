// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! <https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT> (4.3.16)
//!
//! The end of central directory record may be followed by a variable-length comment, so we cannot assume that it
//! starts 22 bytes before the end of the data and must search for it ourselves.
//!
//! Data is read backwards in fixed-size buffers which overlap by the signature length minus one, so that a signature
//! straddling two buffers is still seen exactly once. Every match within a buffer is yielded, latest first, as the
//! comment itself may contain bytes which look like a signature. Callers validate each candidate and move on to the
//! next when it doesn't hold up.

use crate::read::source::ReadAt;
use crate::spec::consts::{EOCDR_LENGTH, EOCDR_SIGNATURE, SIGNATURE_LENGTH};

use std::io;

/// The buffer size used when locating the EOCDR, equal to 2KiB.
const BUFFER_SIZE: usize = 2048;

/// The furthest distance from the end of the data that an EOCDR signature can start at.
const EOCDR_SEARCH_DISTANCE: u64 = (SIGNATURE_LENGTH + EOCDR_LENGTH) as u64 + u16::MAX as u64;

/// A backwards search for EOCDR signature candidates.
pub(crate) struct Locator<'a, R: ?Sized> {
    source: &'a R,
    lower: u64,
    window_end: u64,
    pending: Vec<u64>,
    buffer: Vec<u8>,
}

impl<'a, R: ReadAt + ?Sized> Locator<'a, R> {
    /// Prepares a search over a source of `length` bytes.
    ///
    /// Unless `unbounded`, only positions within reach of a maximum-length comment are searched.
    pub(crate) fn new(source: &'a R, length: u64, unbounded: bool) -> Self {
        let window_end = length.saturating_sub(EOCDR_LENGTH as u64);
        let lower = if unbounded { 0 } else { length.saturating_sub(EOCDR_SEARCH_DISTANCE) };

        Self { source, lower, window_end, pending: Vec::new(), buffer: vec![0; BUFFER_SIZE] }
    }

    /// Returns the position of the next candidate signature, moving from the end of the data towards its start.
    pub(crate) fn next_candidate(&mut self) -> io::Result<Option<u64>> {
        let signature = EOCDR_SIGNATURE.to_le_bytes();

        loop {
            if let Some(position) = self.pending.pop() {
                return Ok(Some(position));
            }

            if self.window_end < self.lower + SIGNATURE_LENGTH as u64 {
                return Ok(None);
            }

            let start = self.window_end.saturating_sub(BUFFER_SIZE as u64).max(self.lower);
            let buffer = &mut self.buffer[..(self.window_end - start) as usize];
            self.source.read_exact_at(buffer, start)?;

            let mut end = buffer.len();
            while let Some(index) = reverse_search_buffer(&buffer[..end], &signature) {
                self.pending.push(start + index as u64);
                end = index;
            }
            self.pending.reverse();

            self.window_end = if start == self.lower { self.lower } else { start + (SIGNATURE_LENGTH - 1) as u64 };
        }
    }
}

/// A naive reverse linear search along the buffer for the specified signature bytes.
///
/// Returns the index at which the last complete match starts.
pub(crate) fn reverse_search_buffer(buffer: &[u8], signature: &[u8]) -> Option<usize> {
    let last = buffer.len().checked_sub(signature.len())?;
    (0..=last).rev().find(|&index| buffer[index..].starts_with(signature))
}
