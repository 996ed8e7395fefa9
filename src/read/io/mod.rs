// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod bounded;
pub(crate) mod compressed;
pub(crate) mod entry;
pub(crate) mod hashed;
pub(crate) mod inflate;

use std::io;

/// Converts a decompression failure into an I/O error.
pub(crate) fn invalid_data(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("invalid deflate stream: {err}"))
}

/// Reads and discards up to `amount` bytes, returning how many were discarded.
pub(crate) fn discard<R: io::Read + ?Sized>(reader: &mut R, mut amount: u64) -> io::Result<u64> {
    let mut scratch = [0u8; 8 * 1024];
    let mut discarded = 0;

    while amount > 0 {
        let wanted = amount.min(scratch.len() as u64) as usize;
        let read = match reader.read(&mut scratch[..wanted]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        amount -= read as u64;
        discarded += read as u64;
    }

    Ok(discarded)
}
