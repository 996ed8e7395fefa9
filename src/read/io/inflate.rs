// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::pool::PooledDecompressor;
use crate::read::io::invalid_data;

use std::io::{self, Read};

use flate2::{FlushDecompress, Status};

const INPUT_BUFFER_SIZE: usize = 8 * 1024;

/// A reader which inflates a raw deflate stream using a pooled decompressor.
pub(crate) struct InflateReader<R> {
    inner: R,
    decompress: PooledDecompressor,
    input: Box<[u8]>,
    position: usize,
    filled: usize,
    inner_eof: bool,
    synthetic_sent: bool,
    finished: bool,
}

impl<R: Read> InflateReader<R> {
    pub(crate) fn new(inner: R, decompress: PooledDecompressor) -> Self {
        Self {
            inner,
            decompress,
            input: vec![0; INPUT_BUFFER_SIZE].into_boxed_slice(),
            position: 0,
            filled: 0,
            inner_eof: false,
            synthetic_sent: false,
            finished: false,
        }
    }

    /// Runs the decompressor once, returning (consumed, produced, ended).
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> io::Result<(usize, usize, bool)> {
        let before_in = self.decompress.total_in();
        let before_out = self.decompress.total_out();
        let status = self.decompress.decompress(input, output, FlushDecompress::None).map_err(invalid_data)?;

        let consumed = (self.decompress.total_in() - before_in) as usize;
        let produced = (self.decompress.total_out() - before_out) as usize;
        Ok((consumed, produced, status == Status::StreamEnd))
    }
}

impl<R: Read> Read for InflateReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.finished {
                return Ok(0);
            }

            if self.position == self.filled && !self.inner_eof {
                self.filled = self.inner.read(&mut self.input)?;
                self.position = 0;
                self.inner_eof = self.filled == 0;
            }

            if self.position < self.filled {
                let input = std::mem::take(&mut self.input);
                let result = self.step(&input[self.position..self.filled], buf);
                self.input = input;

                let (consumed, produced, ended) = result?;
                self.position += consumed;
                self.finished = ended;

                if produced > 0 || ended {
                    return Ok(produced);
                }
                if consumed == 0 {
                    return Err(invalid_data("no progress"));
                }
                continue;
            }

            // The source is exhausted; flush whatever the decompressor still holds.
            let (_, produced, ended) = self.step(&[], buf)?;
            self.finished = ended;
            if produced > 0 || ended {
                return Ok(produced);
            }

            // Some encoders end the stream without the lookahead byte the decoder wants.
            if !self.synthetic_sent {
                self.synthetic_sent = true;
                let (_, produced, ended) = self.step(&[0], buf)?;
                self.finished = ended;
                if produced > 0 || ended {
                    return Ok(produced);
                }
            }

            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "deflate stream ended early"));
        }
    }
}
