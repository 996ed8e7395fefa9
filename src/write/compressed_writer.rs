// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::spec::compression::{Compression, DeflateOption};

use std::io::{self, Write};

use flate2::{Compress, FlushCompress, Status};

const OUTPUT_BUFFER_SIZE: usize = 32 * 1024;

/// The per-entry encoding state between the caller's bytes and the archive.
///
/// The encoder doesn't own the output so that the archive writer can keep tracking offsets while an entry is open.
pub(crate) enum CompressedWriter {
    Passthrough,
    Deflate { compress: Compress, buffer: Box<[u8]> },
}

impl CompressedWriter {
    /// Constructs the encoder for an entry; pre-compressed data is passed through unchanged.
    pub(crate) fn new(compression: Compression, option: DeflateOption, precompressed: bool) -> Self {
        match (compression, precompressed) {
            (Compression::Deflate, false) => CompressedWriter::Deflate {
                compress: Compress::new(option.into_level(), false),
                buffer: vec![0; OUTPUT_BUFFER_SIZE].into_boxed_slice(),
            },
            _ => CompressedWriter::Passthrough,
        }
    }

    pub(crate) fn write<W: Write>(&mut self, output: &mut W, mut input: &[u8]) -> io::Result<()> {
        let (compress, buffer) = match self {
            CompressedWriter::Passthrough => return output.write_all(input),
            CompressedWriter::Deflate { compress, buffer } => (compress, buffer),
        };

        while !input.is_empty() {
            let (consumed, produced, _) = step(compress, input, buffer, FlushCompress::None)?;
            output.write_all(&buffer[..produced])?;
            input = &input[consumed..];

            if consumed == 0 && produced == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "deflate encoder made no progress"));
            }
        }
        Ok(())
    }

    /// Flushes all buffered data and terminates the deflate stream.
    pub(crate) fn finish<W: Write>(&mut self, output: &mut W) -> io::Result<()> {
        let (compress, buffer) = match self {
            CompressedWriter::Passthrough => return Ok(()),
            CompressedWriter::Deflate { compress, buffer } => (compress, buffer),
        };

        loop {
            let (_, produced, ended) = step(compress, &[], buffer, FlushCompress::Finish)?;
            output.write_all(&buffer[..produced])?;
            if ended {
                return Ok(());
            }
        }
    }
}

fn step(
    compress: &mut Compress,
    input: &[u8],
    output: &mut [u8],
    flush: FlushCompress,
) -> io::Result<(usize, usize, bool)> {
    let before_in = compress.total_in();
    let before_out = compress.total_out();
    let status = compress.compress(input, output, flush).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let consumed = (compress.total_in() - before_in) as usize;
    let produced = (compress.total_out() - before_out) as usize;
    Ok((consumed, produced, status == Status::StreamEnd))
}
