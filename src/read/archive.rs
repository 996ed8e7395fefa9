// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! The handle of an opened archive.

use crate::chain::SequentialErrors;
use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::file::ZipFile;
use crate::opts::{BusyPolicy, ReadOptions, SyncOptions};
use crate::pool::DecompressorPool;
use crate::read::io::bounded::BoundedReader;
use crate::read::io::compressed::CompressedReader;
use crate::read::io::entry::{EntryStream, StreamHandle, ZipEntryReader};
use crate::read::io::hashed::{HashedReader, ShadowHashedReader};
use crate::read::io::inflate::InflateReader;
use crate::read::source::ReadAt;
use crate::resource::ResourceAccountant;
use crate::spec::compression::Compression;
use crate::spec::consts::{DATA_DESCRIPTOR_SIGNATURE, LFH_LENGTH, LFH_SIGNATURE, SIGNATURE_LENGTH};
use crate::spec::extra_field::without_zip64;
use crate::spec::header::LocalFileHeader;
use crate::string::ZipString;
use crate::write::ZipFileWriter;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An opened archive over a random-access source.
///
/// The central directory is resolved once, when the archive is opened. Cloning the handle is cheap and every clone
/// shares the same source, entry table, decompressor pool and accountant, so clones can be handed to other threads
/// which then open their own entry readers.
pub struct ZipArchive<S: ReadAt> {
    source: Arc<S>,
    file: Arc<ZipFile>,
    pool: Arc<DecompressorPool>,
    accountant: Arc<ResourceAccountant>,
    closed: Arc<AtomicBool>,
}

impl<S: ReadAt> Clone for ZipArchive<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            file: Arc::clone(&self.file),
            pool: Arc::clone(&self.pool),
            accountant: Arc::clone(&self.accountant),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<S: ReadAt> ZipArchive<S> {
    /// Opens an archive with the default [`ReadOptions`].
    pub fn open(source: S) -> Result<Self> {
        Self::open_with(source, &ReadOptions::default())
    }

    pub fn open_with(source: S, options: &ReadOptions) -> Result<Self> {
        let pool = DecompressorPool::new(options.pool_capacity);
        Self::open_with_pool(source, options, pool)
    }

    /// Opens an archive which borrows decompressors from an existing pool.
    pub fn open_with_pool(source: S, options: &ReadOptions, pool: Arc<DecompressorPool>) -> Result<Self> {
        let file = crate::read::file(&source, options)?;

        Ok(Self {
            source: Arc::new(source),
            file: Arc::new(file),
            pool,
            accountant: ResourceAccountant::new(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the resolved central directory.
    pub fn file(&self) -> &ZipFile {
        &self.file
    }

    pub fn entries(&self) -> &[ZipEntry] {
        self.file.entries()
    }

    /// Returns a copy of the entry with the given name.
    pub fn entry(&self, name: &str) -> Option<ZipEntry> {
        self.file.entry(name).cloned()
    }

    pub fn comment(&self) -> &ZipString {
        self.file.comment()
    }

    /// Returns the number of resolved entries.
    pub fn len(&self) -> usize {
        self.file.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries().is_empty()
    }

    pub fn preamble(&self) -> u64 {
        self.file.preamble()
    }

    pub fn postamble(&self) -> u64 {
        self.file.postamble()
    }

    pub fn accountant(&self) -> &Arc<ResourceAccountant> {
        &self.accountant
    }

    pub fn pool(&self) -> &Arc<DecompressorPool> {
        &self.pool
    }

    /// Returns whether any entry reader is still open against this archive.
    pub fn busy(&self) -> bool {
        self.accountant.resources() > 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Opens a checked, decompressing reader for the named entry.
    pub fn reader(&self, name: &str) -> Result<ZipEntryReader<S>> {
        self.reader_with(name, true, true)
    }

    /// Opens a reader for the named entry.
    ///
    /// With `check`, the CRC32 recorded in the central directory is first compared against the local header (or data
    /// descriptor), and the CRC32 of the entry's content is verified when the reader is closed. Without `decompress`,
    /// the reader returns the entry's data as stored.
    pub fn reader_with(&self, name: &str, check: bool, decompress: bool) -> Result<ZipEntryReader<S>> {
        self.ensure_open()?;
        let entry = self.entry(name).ok_or_else(|| ZipError::EntryNotFound(name.to_string()))?;
        self.open_entry(entry, check, decompress)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ZipError::ResourceClosed);
        }
        Ok(())
    }

    fn open_entry(&self, entry: ZipEntry, check: bool, decompress: bool) -> Result<ZipEntryReader<S>> {
        if entry.flags().encrypted {
            return Err(ZipError::FeatureNotSupported("encrypted entries").with_entry(entry.key()));
        }

        let header_offset = self.file.mapper().map(entry.header_offset().unwrap_or_default())?;
        let lfh = self.local_header(header_offset).map_err(|err| err.with_entry(entry.key()))?;

        let data_offset = header_offset
            + (SIGNATURE_LENGTH + LFH_LENGTH) as u64
            + u64::from(lfh.file_name_length)
            + u64::from(lfh.extra_field_length);
        let compressed_size = entry.compressed_size().unwrap_or_default();
        let data_end = match data_offset.checked_add(compressed_size) {
            Some(end) if end <= self.file.length() => end,
            _ => {
                let err = ZipError::InvalidArchive("entry data extends past the end of the archive");
                return Err(err.with_entry(entry.key()));
            }
        };

        if check {
            self.cross_check_crc(&entry, &lfh, data_end)?;
        }

        let bounded = BoundedReader::new(Arc::clone(&self.source), data_offset, compressed_size);
        let stream = match (entry.compression(), check, decompress) {
            (Compression::Stored, false, _) | (Compression::Deflate, false, false) => {
                EntryStream::Unchecked(CompressedReader::Stored(bounded))
            }
            (Compression::Deflate, false, true) => {
                EntryStream::Unchecked(CompressedReader::Deflate(InflateReader::new(bounded, self.pool.acquire())))
            }
            (Compression::Stored, true, _) => {
                EntryStream::Checked(HashedReader::new(CompressedReader::Stored(bounded)))
            }
            (Compression::Deflate, true, true) => EntryStream::Checked(HashedReader::new(CompressedReader::Deflate(
                InflateReader::new(bounded, self.pool.acquire()),
            ))),
            (Compression::Deflate, true, false) => {
                EntryStream::ShadowChecked(ShadowHashedReader::new(bounded, self.pool.acquire()))
            }
        };

        let handle = StreamHandle::new(entry.key());
        self.accountant.start_accounting_for(&handle);
        Ok(ZipEntryReader::new(entry, stream, handle, &self.accountant))
    }

    fn local_header(&self, offset: u64) -> Result<LocalFileHeader> {
        let mut signature = [0; SIGNATURE_LENGTH];
        self.source.read_exact_at(&mut signature, offset)?;
        let signature = u32::from_le_bytes(signature);
        if signature != LFH_SIGNATURE {
            return Err(ZipError::UnexpectedHeaderError(signature, LFH_SIGNATURE));
        }

        let mut buffer = [0; LFH_LENGTH];
        self.source.read_exact_at(&mut buffer, offset + SIGNATURE_LENGTH as u64)?;
        Ok(LocalFileHeader::from(buffer))
    }

    /// Compares the central directory's CRC32 with the one carried by the local header or its data descriptor.
    fn cross_check_crc(&self, entry: &ZipEntry, lfh: &LocalFileHeader, data_end: u64) -> Result<()> {
        let central = entry.crc32().unwrap_or_default();

        let local = if lfh.flags.data_descriptor {
            // The descriptor signature is optional.
            let mut buffer = [0; 8];
            self.source.read_exact_at(&mut buffer, data_end)?;
            match u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) {
                DATA_DESCRIPTOR_SIGNATURE => u32::from_le_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]),
                crc => crc,
            }
        } else {
            lfh.crc
        };

        if central != local {
            return Err(ZipError::HeaderCrcMismatch { central, local });
        }
        Ok(())
    }

    /// Ensures no other thread holds a stream open against this archive.
    ///
    /// Waits up to the configured timeout for other threads' readers to close. If some remain, this either fails as
    /// [`ZipError::Busy`] or forcibly closes every accounted reader, depending on the [`BusyPolicy`].
    pub fn prepare_rewrite(&self, options: &SyncOptions) -> Result<()> {
        let remaining = self.accountant.wait_other_threads(options.timeout)?;
        if remaining == 0 {
            return Ok(());
        }

        match options.policy {
            BusyPolicy::Fail => Err(ZipError::Busy { resources: remaining }),
            BusyPolicy::ForceClose => {
                tracing::debug!(remaining, "forcibly closing readers held by other threads");
                let mut errors = SequentialErrors::new();
                self.accountant.close_all_resources(&mut errors);
                errors.finish()
            }
        }
    }

    /// Copies every resolved entry, as stored, into `writer`.
    ///
    /// Each entry's integrity is checked while it is copied. An entry which fails is abandoned in the writer and the
    /// copy continues with the next one; all failures are reported together once every entry has been attempted.
    /// The writer is left unfinished.
    pub fn sync_into<W: Write>(&self, writer: &mut ZipFileWriter<W>, options: &SyncOptions) -> Result<()> {
        self.ensure_open()?;
        self.prepare_rewrite(options)?;

        let mut errors = SequentialErrors::new();
        for entry in self.file.entries() {
            if let Err(err) = self.copy_entry(entry, writer) {
                writer.abandon_entry()?;
                errors.push(err.with_entry(entry.key()));
            }
        }

        errors.finish()
    }

    fn copy_entry<W: Write>(&self, entry: &ZipEntry, writer: &mut ZipFileWriter<W>) -> Result<()> {
        let mut reader = self.open_entry(entry.clone(), true, false)?;

        let mut copy = entry.clone();
        copy.extra_fields = without_zip64(entry.extra_fields());
        copy.header_offset = None;

        writer.begin_entry(copy, true)?;
        if let Err(err) = io::copy(&mut reader, writer) {
            reader.close()?;
            return Err(err.into());
        }
        reader.close()?;
        writer.close_entry()
    }

    /// Closes this archive.
    ///
    /// Other threads' readers are handled as by [`prepare_rewrite()`](Self::prepare_rewrite); any reader still open
    /// afterwards is invalidated. Once closed, no new readers can be opened. Closing twice does nothing.
    pub fn close(&self, options: &SyncOptions) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        self.prepare_rewrite(options)?;
        self.closed.store(true, Ordering::SeqCst);

        let mut errors = SequentialErrors::new();
        self.accountant.close_all_resources(&mut errors);
        errors.finish()
    }
}
