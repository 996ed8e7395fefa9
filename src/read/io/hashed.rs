// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::pool::PooledDecompressor;
use crate::read::io::invalid_data;

use std::io::{self, Read};

use crc32fast::Hasher;
use flate2::{FlushDecompress, Status};

/// A wrapping reader which computes the CRC32 hash of data read via [`Read`].
pub(crate) struct HashedReader<R> {
    pub(crate) reader: R,
    pub(crate) hasher: Hasher,
}

impl<R: Read> HashedReader<R> {
    /// Constructs a new wrapping reader from a generic [`Read`] implementer.
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, hasher: Hasher::default() }
    }

    /// Swaps the internal hasher and returns the computed CRC32 hash.
    ///
    /// The internal hasher is taken and replaced with a newly-constructed one. As a result, this method should only be
    /// called once EOF has been reached and it's known that no more data will be read, else the computed hash(s) won't
    /// accurately represent the data read in.
    pub(crate) fn swap_and_compute_hash(&mut self) -> u32 {
        std::mem::take(&mut self.hasher).finalize()
    }
}

impl<R: Read> Read for HashedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.reader.read(buf)?;
        self.hasher.update(&buf[..read]);
        Ok(read)
    }
}

const SCRATCH_SIZE: usize = 16 * 1024;

/// A reader which returns compressed bytes unchanged while hashing their decompressed form.
///
/// Every chunk handed to the caller is also inflated into a private scratch buffer, so the CRC32 of the entry's
/// content can be checked without decompressing it for the caller.
pub(crate) struct ShadowHashedReader<R> {
    reader: R,
    decompress: PooledDecompressor,
    scratch: Box<[u8]>,
    hasher: Hasher,
    ended: bool,
}

impl<R: Read> ShadowHashedReader<R> {
    pub(crate) fn new(reader: R, decompress: PooledDecompressor) -> Self {
        Self {
            reader,
            decompress,
            scratch: vec![0; SCRATCH_SIZE].into_boxed_slice(),
            hasher: Hasher::default(),
            ended: false,
        }
    }

    fn feed(&mut self, mut input: &[u8]) -> io::Result<()> {
        while !self.ended {
            let before_in = self.decompress.total_in();
            let before_out = self.decompress.total_out();
            let status =
                self.decompress.decompress(input, &mut self.scratch, FlushDecompress::None).map_err(invalid_data)?;

            let consumed = (self.decompress.total_in() - before_in) as usize;
            let produced = (self.decompress.total_out() - before_out) as usize;
            self.hasher.update(&self.scratch[..produced]);
            input = &input[consumed..];
            self.ended = status == Status::StreamEnd;

            if input.is_empty() && produced < self.scratch.len() {
                break;
            }
            if consumed == 0 && produced == 0 {
                return Err(invalid_data("no progress"));
            }
        }
        Ok(())
    }

    /// Flushes the shadow decompressor and returns the CRC32 hash of the decompressed data.
    ///
    /// Only valid once the underlying reader has reached EOF.
    pub(crate) fn finish(&mut self) -> io::Result<u32> {
        if !self.ended {
            self.feed(&[])?;
        }
        if !self.ended {
            self.feed(&[0])?;
        }
        if !self.ended {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "deflate stream ended early"));
        }
        Ok(std::mem::take(&mut self.hasher).finalize())
    }
}

impl<R> ShadowHashedReader<R> {
    /// Swaps the internal hasher and returns the hash of the data decompressed so far.
    pub(crate) fn swap_and_compute_hash(&mut self) -> u32 {
        std::mem::take(&mut self.hasher).finalize()
    }
}

impl<R: Read> Read for ShadowHashedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.reader.read(buf)?;
        self.feed(&buf[..read])?;
        Ok(read)
    }
}
