// Copyright (c) 2021-2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports writing ZIP files.
//!
//! # Example
//! ### Whole data (u8 slice)
//! ```no_run
//! # use mountzip::{Compression, ZipEntryBuilder, write::ZipFileWriter};
//! # use mountzip::error::ZipError;
//! # use std::fs::File;
//! #
//! # fn run() -> Result<(), ZipError> {
//! let mut writer = ZipFileWriter::new(File::create("foo.zip")?);
//!
//! let data = b"This is an example file.";
//! let builder = ZipEntryBuilder::new(String::from("foo.txt").into(), Compression::Deflate);
//!
//! writer.write_entry_whole(builder, data)?;
//! writer.close()?;
//! #   Ok(())
//! # }
//! ```
//! ### Stream data (unknown size & data)
//! ```no_run
//! # use mountzip::{Compression, ZipEntryBuilder, write::ZipFileWriter};
//! # use mountzip::error::ZipError;
//! # use std::fs::File;
//! # use std::io::Write;
//! #
//! # fn run() -> Result<(), ZipError> {
//! let mut writer = ZipFileWriter::new(File::create("foo.zip")?);
//!
//! let builder = ZipEntryBuilder::new(String::from("bar.txt").into(), Compression::Deflate);
//! writer.begin_entry(builder, false)?;
//! writer.write_all(b"This is an example file.")?;
//! writer.close_entry()?;
//!
//! writer.close()?;
//! #   Ok(())
//! # }
//! ```

pub(crate) mod compressed_writer;
pub(crate) mod io;

use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::spec::compression::Compression;
use crate::spec::consts::{
    CDH_SIGNATURE, DATA_DESCRIPTOR_SIGNATURE, EOCDR_SIGNATURE, LFH_SIGNATURE, NON_ZIP64_MAX_NUM_FILES,
    NON_ZIP64_MAX_SIZE, ZIP64_EOCDL_SIGNATURE, ZIP64_EOCDR_LENGTH, ZIP64_EOCDR_SIGNATURE,
};
use crate::spec::extra_field::{without_zip64, ExtraFieldAsBytes};
use crate::spec::header::{
    CentralDirectoryRecord, EndOfCentralDirectoryHeader, ExtraField, GeneralPurposeFlag, LocalFileHeader,
    Zip64EndOfCentralDirectoryLocator, Zip64EndOfCentralDirectoryRecord, Zip64ExtendedInformationExtraField,
};
use crate::spec::version::{as_archive_made_by, as_made_by, as_needed_to_extract, ZIP64_VERSION_NEEDED};
use crate::string::ZipString;
use compressed_writer::CompressedWriter;
use io::offset::OffsetWriter;

use std::collections::HashSet;
use std::io::Write;

use crc32fast::Hasher;

const MAX_SIZE: u64 = NON_ZIP64_MAX_SIZE as u64;
const MAX_NUM_FILES: u64 = NON_ZIP64_MAX_NUM_FILES as u64;

/// The entry currently being written.
struct ActiveEntry {
    entry: ZipEntry,
    encoder: CompressedWriter,
    hasher: Hasher,
    consumed: u64,
    header_offset: u64,
    data_offset: u64,
    precompressed: bool,
    descriptor: bool,
    lfh_zip64: bool,
}

/// A ZIP file writer which acts over [`Write`] implementers.
///
/// Entries are written one at a time: [`begin_entry()`](Self::begin_entry), any number of writes through the
/// [`Write`] implementation, then [`close_entry()`](Self::close_entry). Beginning an entry while another is open
/// closes the open one first.
///
/// # Note
/// - [`ZipFileWriter::close()`] (or [`ZipFileWriter::finish()`]) must be called before the writer goes out of scope.
pub struct ZipFileWriter<W: Write> {
    writer: OffsetWriter<W>,
    cd_entries: Vec<ZipEntry>,
    active: Option<ActiveEntry>,
    names: HashSet<Vec<u8>>,
    /// Whether every record is written in its Zip64 form.
    force_zip64: bool,
    strict_names: bool,
    comment: ZipString,
    finished: bool,
}

impl<W: Write> ZipFileWriter<W> {
    /// Construct a new ZIP file writer from a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: OffsetWriter::new(writer),
            cd_entries: Vec::new(),
            active: None,
            names: HashSet::new(),
            force_zip64: false,
            strict_names: false,
            comment: ZipString::default(),
            finished: false,
        }
    }

    /// Force the ZIP writer to emit Zip64 structs for every record.
    pub fn force_zip64(mut self) -> Self {
        self.force_zip64 = true;
        self
    }

    /// Reject entries whose name has already been written.
    ///
    /// By default a later entry with the same name is written and shadows the earlier one when read back.
    pub fn strict_names(mut self) -> Self {
        self.strict_names = true;
        self
    }

    /// Set the ZIP file comment.
    pub fn comment(mut self, comment: ZipString) -> Self {
        self.comment = comment;
        self
    }

    /// Returns the entries which have been completely written so far.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.cd_entries
    }

    /// Returns a mutable reference to the inner writer.
    ///
    /// Care should be taken when using this inner writer as doing so may invalidate internal state of this writer.
    pub fn inner_mut(&mut self) -> &mut W {
        self.writer.inner_mut()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.finished {
            return Err(ZipError::WriterFinished);
        }
        Ok(())
    }

    /// Begins writing a new entry.
    ///
    /// With `precompressed`, data written for a deflate entry is already compressed and is stored as given. Stored and
    /// pre-compressed entries must declare their CRC32 and both sizes up front; the written data is checked against
    /// them when the entry is closed. Otherwise the data is compressed here and the final values are emitted in a
    /// data descriptor after it.
    ///
    /// # Note
    /// A streamed entry's local header is written before its sizes are known, so it only carries a Zip64 extended
    /// information field when [`force_zip64()`](Self::force_zip64) is set. An entry which then grows past 4 GiB is
    /// still recorded correctly in the central directory and its data descriptor, but strictly conforming readers
    /// which rely on the local header expect that field; set `force_zip64()` when streaming entries of that size.
    pub fn begin_entry<E: Into<ZipEntry>>(&mut self, entry: E, precompressed: bool) -> Result<()> {
        self.ensure_writable()?;
        if self.active.is_some() {
            self.close_entry()?;
        }

        let mut entry = entry.into();
        let name = entry.key();

        if self.strict_names && self.names.contains(entry.filename().stored_bytes()) {
            return Err(ZipError::DuplicateEntry(name));
        }

        let descriptor = entry.compression() == Compression::Deflate && !precompressed;
        if !descriptor {
            let missing = |field| ZipError::MissingEntryMetadata { name: name.clone(), field };
            entry.crc32.ok_or_else(|| missing("CRC32"))?;
            let compressed = entry.compressed_size.ok_or_else(|| missing("compressed size"))?;
            let uncompressed = entry.uncompressed_size.ok_or_else(|| missing("uncompressed size"))?;

            if entry.compression() == Compression::Stored && compressed != uncompressed {
                return Err(ZipError::EntryMetadataMismatch {
                    name,
                    field: "compressed size",
                    declared: compressed,
                    actual: uncompressed,
                });
            }
        }

        let known_large = !descriptor
            && (entry.compressed_size.unwrap_or_default() >= MAX_SIZE
                || entry.uncompressed_size.unwrap_or_default() >= MAX_SIZE);
        let lfh_zip64 = self.force_zip64 || known_large;

        entry.extra_fields = without_zip64(entry.extra_fields());
        entry.flags = GeneralPurposeFlag {
            encrypted: false,
            data_descriptor: descriptor,
            filename_unicode: entry.filename().requires_utf8_flag() || entry.comment().requires_utf8_flag(),
        };
        entry.header_offset = None;

        let mut extra_fields = entry.extra_fields.clone();
        if lfh_zip64 {
            let field = Zip64ExtendedInformationExtraField {
                uncompressed_size: Some(entry.uncompressed_size.unwrap_or_default()),
                compressed_size: Some(entry.compressed_size.unwrap_or_default()),
                relative_header_offset: None,
                disk_start_number: None,
            };
            extra_fields.insert(0, ExtraField::Zip64ExtendedInformation(field));
        }

        let (crc, compressed_size, uncompressed_size) = match (descriptor, lfh_zip64) {
            (_, true) => (entry.crc32.unwrap_or_default(), NON_ZIP64_MAX_SIZE, NON_ZIP64_MAX_SIZE),
            (true, false) => (0, 0, 0),
            (false, false) => (
                entry.crc32.unwrap_or_default(),
                entry.compressed_size.unwrap_or_default() as u32,
                entry.uncompressed_size.unwrap_or_default() as u32,
            ),
        };

        let filename = entry.filename().stored_bytes();
        let extra = extra_fields.as_bytes();
        let lfh = LocalFileHeader {
            version: as_needed_to_extract(&entry, lfh_zip64),
            flags: entry.flags,
            compression: entry.compression().into(),
            mod_time: entry.last_modification_date().raw_time(),
            mod_date: entry.last_modification_date().raw_date(),
            crc,
            compressed_size,
            uncompressed_size,
            file_name_length: filename.len().try_into().map_err(|_| ZipError::FileNameTooLarge)?,
            extra_field_length: extra.len().try_into().map_err(|_| ZipError::ExtraFieldTooLarge)?,
        };
        if entry.comment().stored_bytes().len() > u16::MAX as usize {
            return Err(ZipError::CommentTooLarge);
        }

        let header_offset = self.writer.offset();
        self.writer.write_all(&LFH_SIGNATURE.to_le_bytes())?;
        self.writer.write_all(&lfh.as_slice())?;
        self.writer.write_all(filename)?;
        self.writer.write_all(&extra)?;

        tracing::trace!(entry = %name, header_offset, descriptor, zip64 = lfh_zip64, "wrote local file header");

        self.active = Some(ActiveEntry {
            encoder: CompressedWriter::new(entry.compression(), entry.deflate_option(), precompressed),
            entry,
            hasher: Hasher::new(),
            consumed: 0,
            header_offset,
            data_offset: self.writer.offset(),
            precompressed,
            descriptor,
            lfh_zip64,
        });
        Ok(())
    }

    /// Finishes the current entry and records it for the central directory.
    pub fn close_entry(&mut self) -> Result<()> {
        let mut active = self.active.take().ok_or(ZipError::NoActiveEntry)?;
        active.encoder.finish(&mut self.writer)?;

        let compressed = self.writer.offset() - active.data_offset;
        let crc = active.hasher.finalize();
        let mut entry = active.entry;
        let name = entry.key();

        if active.descriptor {
            entry.crc32 = Some(crc);
            entry.compressed_size = Some(compressed);
            entry.uncompressed_size = Some(active.consumed);

            self.writer.write_all(&DATA_DESCRIPTOR_SIGNATURE.to_le_bytes())?;
            self.writer.write_all(&crc.to_le_bytes())?;
            // Without a Zip64 field in the local header, an oversized entry still needs the wide descriptor.
            if active.lfh_zip64 || compressed >= MAX_SIZE || active.consumed >= MAX_SIZE {
                self.writer.write_all(&compressed.to_le_bytes())?;
                self.writer.write_all(&active.consumed.to_le_bytes())?;
            } else {
                self.writer.write_all(&(compressed as u32).to_le_bytes())?;
                self.writer.write_all(&(active.consumed as u32).to_le_bytes())?;
            }
        } else {
            let mismatch = |field, declared: Option<u64>, actual| match declared {
                Some(declared) if declared != actual => {
                    Err(ZipError::EntryMetadataMismatch { name: name.clone(), field, declared, actual })
                }
                _ => Ok(()),
            };
            mismatch("compressed size", entry.compressed_size, compressed)?;
            if !active.precompressed || entry.compression() == Compression::Stored {
                mismatch("uncompressed size", entry.uncompressed_size, active.consumed)?;
                mismatch("CRC32", entry.crc32.map(u64::from), u64::from(crc))?;
            }
        }

        entry.header_offset = Some(active.header_offset);
        tracing::trace!(entry = %name, compressed, uncompressed = ?entry.uncompressed_size, "closed entry");

        self.names.insert(entry.filename().stored_bytes().to_vec());
        self.cd_entries.push(entry);
        Ok(())
    }

    /// Stops writing the current entry without recording it.
    ///
    /// Bytes already written stay in place but are not referenced by the central directory.
    pub fn abandon_entry(&mut self) -> Result<()> {
        if let Some(active) = self.active.take() {
            tracing::debug!(entry = %active.entry.key(), "abandoned entry");
        }
        Ok(())
    }

    /// Write a new ZIP entry of known size and data.
    ///
    /// The data is compressed in memory first, so no data descriptor is needed.
    pub fn write_entry_whole<E: Into<ZipEntry>>(&mut self, entry: E, data: &[u8]) -> Result<()> {
        let mut entry = entry.into();

        let compressed = match entry.compression() {
            Compression::Stored => None,
            Compression::Deflate => {
                let mut compressed = Vec::new();
                let mut encoder = CompressedWriter::new(Compression::Deflate, entry.deflate_option(), false);
                encoder.write(&mut compressed, data)?;
                encoder.finish(&mut compressed)?;
                Some(compressed)
            }
        };
        let stored = compressed.as_deref().unwrap_or(data);

        entry.crc32 = Some(crc32fast::hash(data));
        entry.uncompressed_size = Some(data.len() as u64);
        entry.compressed_size = Some(stored.len() as u64);

        self.begin_entry(entry, true)?;
        self.write_all(stored)?;
        self.close_entry()
    }

    /// Completes the archive.
    ///
    /// This includes:
    /// - Closing the current entry, if any.
    /// - Writing all central directory headers.
    /// - Writing the Zip64 end of central directory record and locator, if needed.
    /// - Writing the end of central directory header and the file comment.
    ///
    /// Finishing twice does nothing.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.active.is_some() {
            self.close_entry()?;
        }

        let comment = self.comment.stored_bytes();
        let comment_length: u16 = comment.len().try_into().map_err(|_| ZipError::CommentTooLarge)?;

        let cd_offset = self.writer.offset();
        for entry in &self.cd_entries {
            let (header, extra_fields) = central_directory_record(entry, self.force_zip64)?;
            self.writer.write_all(&CDH_SIGNATURE.to_le_bytes())?;
            self.writer.write_all(&header.as_slice())?;
            self.writer.write_all(entry.filename().stored_bytes())?;
            self.writer.write_all(&extra_fields.as_bytes())?;
            self.writer.write_all(entry.comment().stored_bytes())?;
        }

        let cd_size = self.writer.offset() - cd_offset;
        let num_entries = self.cd_entries.len() as u64;

        let zip64 = self.force_zip64 || num_entries >= MAX_NUM_FILES || cd_size >= MAX_SIZE || cd_offset >= MAX_SIZE;
        if zip64 {
            let eocdr_offset = self.writer.offset();

            let eocdr = Zip64EndOfCentralDirectoryRecord {
                size_of_zip64_end_of_cd_record: (ZIP64_EOCDR_LENGTH - 8) as u64,
                version_made_by: as_archive_made_by(),
                version_needed_to_extract: ZIP64_VERSION_NEEDED,
                disk_number: 0,
                disk_number_start_of_cd: 0,
                num_entries_in_directory_on_disk: num_entries,
                num_entries_in_directory: num_entries,
                directory_size: cd_size,
                offset_of_start_of_directory: cd_offset,
            };
            self.writer.write_all(&ZIP64_EOCDR_SIGNATURE.to_le_bytes())?;
            self.writer.write_all(&eocdr.as_bytes())?;

            let eocdl = Zip64EndOfCentralDirectoryLocator {
                number_of_disk_with_start_of_zip64_end_of_central_directory: 0,
                relative_offset: eocdr_offset,
                total_number_of_disks: 1,
            };
            self.writer.write_all(&ZIP64_EOCDL_SIGNATURE.to_le_bytes())?;
            self.writer.write_all(&eocdl.as_bytes())?;
        }

        let num_entries = num_entries.min(MAX_NUM_FILES) as u16;
        let header = EndOfCentralDirectoryHeader {
            disk_num: 0,
            start_cent_dir_disk: 0,
            num_of_entries_disk: num_entries,
            num_of_entries: num_entries,
            size_cent_dir: cd_size.min(MAX_SIZE) as u32,
            cent_dir_offset: cd_offset.min(MAX_SIZE) as u32,
            file_comm_length: comment_length,
        };

        self.writer.write_all(&EOCDR_SIGNATURE.to_le_bytes())?;
        self.writer.write_all(&header.as_slice())?;
        self.writer.write_all(comment)?;
        self.writer.flush()?;

        tracing::debug!(entries = self.cd_entries.len(), zip64, cd_offset, cd_size, "finished archive");
        self.finished = true;
        Ok(())
    }

    /// Consumes this ZIP writer, completes all closing tasks and returns the inner writer.
    ///
    /// Failure to call this function (or [`finish()`](Self::finish)) before going out of scope would result in a
    /// corrupted ZIP file.
    pub fn close(mut self) -> Result<W> {
        self.finish()?;
        Ok(self.writer.into_inner())
    }
}

impl<W: Write> Write for ZipFileWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let active = self.active.as_mut().ok_or(ZipError::NoActiveEntry)?;

        if !active.precompressed || active.entry.compression() == Compression::Stored {
            active.hasher.update(buf);
        }
        active.consumed += buf.len() as u64;
        active.encoder.write(&mut self.writer, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Builds the central directory record for an entry, along with the extra fields that follow it.
///
/// Each size or offset is moved into the Zip64 extended information field on its own once it reaches the 32-bit
/// sentinel value, or unconditionally when `force_zip64` is set.
pub(crate) fn central_directory_record(
    entry: &ZipEntry,
    force_zip64: bool,
) -> Result<(CentralDirectoryRecord, Vec<ExtraField>)> {
    let uncompressed_size = entry.uncompressed_size().unwrap_or_default();
    let compressed_size = entry.compressed_size().unwrap_or_default();
    let header_offset = entry.header_offset().unwrap_or_default();

    let wide = |value: u64| (force_zip64 || value >= MAX_SIZE).then_some(value);
    let zip64 = Zip64ExtendedInformationExtraField {
        uncompressed_size: wide(uncompressed_size),
        compressed_size: wide(compressed_size),
        relative_header_offset: wide(header_offset),
        disk_start_number: None,
    };
    let narrow = |value: u64, wide: Option<u64>| match wide {
        Some(_) => NON_ZIP64_MAX_SIZE,
        None => value as u32,
    };

    let header = CentralDirectoryRecord {
        v_made_by: as_made_by(entry),
        v_needed: 0,
        flags: entry.flags(),
        compression: entry.compression().into(),
        mod_time: entry.last_modification_date().raw_time(),
        mod_date: entry.last_modification_date().raw_date(),
        crc: entry.crc32().unwrap_or_default(),
        compressed_size: narrow(compressed_size, zip64.compressed_size),
        uncompressed_size: narrow(uncompressed_size, zip64.uncompressed_size),
        file_name_length: entry.filename().stored_bytes().len().try_into().map_err(|_| ZipError::FileNameTooLarge)?,
        extra_field_length: 0,
        file_comment_length: entry.comment().stored_bytes().len().try_into().map_err(|_| ZipError::CommentTooLarge)?,
        disk_start: 0,
        inter_attr: entry.internal_file_attribute(),
        exter_attr: entry.external_file_attribute(),
        lh_offset: narrow(header_offset, zip64.relative_header_offset),
    };

    let needs_zip64 = zip64 != Zip64ExtendedInformationExtraField::default();
    let mut extra_fields = without_zip64(entry.extra_fields());
    if needs_zip64 {
        extra_fields.insert(0, ExtraField::Zip64ExtendedInformation(zip64));
    }

    let header = CentralDirectoryRecord {
        v_needed: as_needed_to_extract(entry, needs_zip64),
        extra_field_length: extra_fields.count_bytes().try_into().map_err(|_| ZipError::ExtraFieldTooLarge)?,
        ..header
    };
    Ok((header, extra_fields))
}
