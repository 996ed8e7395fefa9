// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::read::io::bounded::BoundedReader;
use crate::read::io::compressed::CompressedReader;
use crate::read::io::discard;
use crate::read::io::hashed::{HashedReader, ShadowHashedReader};
use crate::read::source::ReadAt;
use crate::resource::{Resource, ResourceAccountant};

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// The registration of an open entry stream with its archive's accountant.
#[derive(Debug)]
pub(crate) struct StreamHandle {
    name: String,
    closed: AtomicBool,
}

impl StreamHandle {
    pub(crate) fn new(name: String) -> Arc<Self> {
        Arc::new(Self { name, closed: AtomicBool::new(false) })
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Resource for StreamHandle {
    fn close_resource(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(entry = %self.name, "forcibly closed entry stream");
        }
        Ok(())
    }
}

/// The layers composed over an entry's raw bytes.
pub(crate) enum EntryStream<S> {
    Unchecked(CompressedReader<BoundedReader<Arc<S>>>),
    Checked(HashedReader<CompressedReader<BoundedReader<Arc<S>>>>),
    ShadowChecked(ShadowHashedReader<BoundedReader<Arc<S>>>),
    /// The stream was closed and its decompressor returned to the pool.
    Released,
}

impl<S: ReadAt> EntryStream<S> {
    fn is_checked(&self) -> bool {
        matches!(self, EntryStream::Checked(_) | EntryStream::ShadowChecked(_))
    }

    fn compute_hash(&mut self) -> io::Result<u32> {
        match self {
            EntryStream::Unchecked(_) | EntryStream::Released => Ok(0),
            EntryStream::Checked(inner) => Ok(inner.swap_and_compute_hash()),
            EntryStream::ShadowChecked(inner) => inner.finish(),
        }
    }

    /// Returns the hash of whatever was decoded before the stream broke off.
    fn partial_hash(&mut self) -> u32 {
        match self {
            EntryStream::Unchecked(_) | EntryStream::Released => 0,
            EntryStream::Checked(inner) => inner.swap_and_compute_hash(),
            EntryStream::ShadowChecked(inner) => inner.swap_and_compute_hash(),
        }
    }
}

impl<S: ReadAt> Read for EntryStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntryStream::Unchecked(inner) => inner.read(buf),
            EntryStream::Checked(inner) => inner.read(buf),
            EntryStream::ShadowChecked(inner) => inner.read(buf),
            EntryStream::Released => Err(ZipError::ResourceClosed.into()),
        }
    }
}

/// Returns whether a read failed because the entry's data itself is malformed.
fn is_corrupt(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof)
}

/// A ZIP entry reader which may implement decompression and integrity checking.
///
/// The reader is registered with its archive's [`ResourceAccountant`] until it is closed or dropped. It should be
/// closed explicitly with [`close()`](Self::close): for checked readers, that is where the CRC32 of the entry is
/// compared against the value in the central directory.
pub struct ZipEntryReader<S: ReadAt> {
    entry: ZipEntry,
    stream: EntryStream<S>,
    handle: Arc<StreamHandle>,
    accountant: Weak<ResourceAccountant>,
    closed: bool,
    corrupt: bool,
}

impl<S: ReadAt> ZipEntryReader<S> {
    pub(crate) fn new(
        entry: ZipEntry,
        stream: EntryStream<S>,
        handle: Arc<StreamHandle>,
        accountant: &Arc<ResourceAccountant>,
    ) -> Self {
        Self { entry, stream, handle, accountant: Arc::downgrade(accountant), closed: false, corrupt: false }
    }

    /// Returns the entry this reader was opened for.
    pub fn entry(&self) -> &ZipEntry {
        &self.entry
    }

    /// Returns whether this reader has been closed, either explicitly or by its archive.
    pub fn is_closed(&self) -> bool {
        self.closed || self.handle.is_closed()
    }

    /// Skips up to `amount` bytes of the entry's data, returning how many were skipped.
    ///
    /// Skipped bytes still pass through decompression and hashing.
    pub fn skip(&mut self, amount: u64) -> io::Result<u64> {
        discard(self, amount)
    }

    /// Reads all bytes until EOF has been reached, appending them to buf, then closes the reader.
    ///
    /// This is a helper function synonymous to [`Read::read_to_end()`] followed by [`close()`](Self::close). The reader
    /// is closed even if reading fails, in which case a checked reader reports corrupt data as a CRC32 mismatch.
    pub fn read_to_end_checked(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        match self.read_to_end(buf) {
            Ok(read) => {
                self.close()?;
                Ok(read)
            }
            Err(err) => {
                self.close()?;
                Err(err.into())
            }
        }
    }

    /// Closes this reader.
    ///
    /// A checked reader first consumes any unread data and then compares the computed CRC32 against the entry's. Data
    /// which fails to decompress, or ends before its deflate stream does, is reported here as a CRC32 mismatch too.
    /// The reader's decompressor goes back to the pool. Closing an already closed reader does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.verify();
        self.release();
        self.unregister();
        result
    }

    fn verify(&mut self) -> Result<()> {
        if self.handle.is_closed() || !self.stream.is_checked() {
            return Ok(());
        }

        let expected = self.entry.crc32().unwrap_or_default();
        if !self.corrupt {
            match discard(&mut self.stream, u64::MAX).and_then(|_| self.stream.compute_hash()) {
                Ok(actual) if actual == expected => return Ok(()),
                Ok(actual) => return Err(ZipError::CRC32CheckError { expected, actual }),
                Err(err) if is_corrupt(&err) => {
                    tracing::debug!(entry = %self.handle.name, error = %err, "entry data is corrupt");
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Undecodable data fails even when the bytes decoded so far hash to the expected value.
        Err(ZipError::CRC32CheckError { expected, actual: self.stream.partial_hash() })
    }

    fn release(&mut self) {
        self.stream = EntryStream::Released;
    }

    fn unregister(&self) {
        if let Some(accountant) = self.accountant.upgrade() {
            accountant.stop_accounting_for(&self.handle);
        }
    }
}

impl<S: ReadAt> Read for ZipEntryReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_closed() {
            // Forcibly closed readers give their decompressor back on their next use.
            self.release();
            return Err(ZipError::ResourceClosed.into());
        }

        let result = self.stream.read(buf);
        if let Err(err) = &result {
            self.corrupt |= is_corrupt(err);
        }
        result
    }
}

impl<S: ReadAt> Drop for ZipEntryReader<S> {
    fn drop(&mut self) {
        if !self.closed {
            if !self.handle.is_closed() {
                tracing::warn!(entry = %self.handle.name, "entry reader dropped without being closed");
            }
            self.unregister();
        }
    }
}
