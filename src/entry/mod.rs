// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub mod builder;

use crate::date::ZipDateTime;
use crate::spec::attribute::AttributeCompatibility;
use crate::spec::compression::{Compression, DeflateOption};
use crate::spec::header::{ExtraField, GeneralPurposeFlag};
use crate::string::ZipString;

use self::builder::ZipEntryBuilder;

/// The metadata record of a single archive member.
///
/// Entries are created by name through [`ZipEntry::new()`] (or [`ZipEntryBuilder`]) and are populated either by the
/// central directory reader or by the caller together with the bookkeeping of
/// [`ZipFileWriter`](crate::write::ZipFileWriter).
///
/// The CRC, both sizes and the header offset are `None` until they are known. In-memory sizes and offsets are always
/// 64-bit; whether they need Zip64 extensions is decided when a record is serialised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZipEntry {
    pub(crate) filename: ZipString,
    pub(crate) compression: Compression,
    pub(crate) compression_level: DeflateOption,
    pub(crate) crc32: Option<u32>,
    pub(crate) uncompressed_size: Option<u64>,
    pub(crate) compressed_size: Option<u64>,
    pub(crate) attribute_compatibility: AttributeCompatibility,
    pub(crate) last_modification_date: ZipDateTime,
    pub(crate) internal_file_attribute: u16,
    pub(crate) external_file_attribute: u32,
    pub(crate) flags: GeneralPurposeFlag,
    pub(crate) extra_fields: Vec<ExtraField>,
    pub(crate) comment: ZipString,
    pub(crate) header_offset: Option<u64>,
}

impl From<ZipEntryBuilder> for ZipEntry {
    fn from(builder: ZipEntryBuilder) -> Self {
        builder.0
    }
}

impl ZipEntry {
    pub(crate) fn new(filename: ZipString, compression: Compression) -> Self {
        ZipEntry {
            filename,
            compression,
            compression_level: DeflateOption::default(),
            crc32: None,
            uncompressed_size: None,
            compressed_size: None,
            attribute_compatibility: AttributeCompatibility::Unix,
            last_modification_date: ZipDateTime::default(),
            internal_file_attribute: 0,
            external_file_attribute: 0,
            flags: GeneralPurposeFlag::default(),
            extra_fields: Vec::new(),
            comment: String::new().into(),
            header_offset: None,
        }
    }

    /// Returns the entry's filename.
    ///
    /// ## Note
    /// This will return the raw filename stored during ZIP creation. If calling this method on entries retrieved from
    /// untrusted ZIP files, the filename should be sanitised before being used as a path to prevent [directory
    /// traversal attacks](https://en.wikipedia.org/wiki/Directory_traversal_attack).
    pub fn filename(&self) -> &ZipString {
        &self.filename
    }

    /// Returns the entry's compression method.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the entry's deflate compression option.
    pub fn deflate_option(&self) -> DeflateOption {
        self.compression_level
    }

    /// Returns the entry's CRC32 value, if known.
    pub fn crc32(&self) -> Option<u32> {
        self.crc32
    }

    /// Returns the entry's uncompressed size, if known.
    pub fn uncompressed_size(&self) -> Option<u64> {
        self.uncompressed_size
    }

    /// Returns the entry's compressed size, if known.
    pub fn compressed_size(&self) -> Option<u64> {
        self.compressed_size
    }

    /// Returns the entry's attribute host compatibility.
    pub fn attribute_compatibility(&self) -> AttributeCompatibility {
        self.attribute_compatibility
    }

    /// Returns the entry's last modification time & date.
    pub fn last_modification_date(&self) -> &ZipDateTime {
        &self.last_modification_date
    }

    /// Returns the entry's internal file attribute.
    pub fn internal_file_attribute(&self) -> u16 {
        self.internal_file_attribute
    }

    /// Returns the entry's external file attribute.
    pub fn external_file_attribute(&self) -> u32 {
        self.external_file_attribute
    }

    /// Returns the entry's general purpose flag bits.
    pub fn flags(&self) -> GeneralPurposeFlag {
        self.flags
    }

    /// Returns the entry's extra field data.
    pub fn extra_fields(&self) -> &[ExtraField] {
        &self.extra_fields
    }

    /// Returns the entry's file comment.
    pub fn comment(&self) -> &ZipString {
        &self.comment
    }

    /// Returns the offset of the entry's local file header as recorded in the central directory.
    ///
    /// This is not necessarily the real position within the underlying storage; see
    /// [`OffsetMapper`](crate::read::OffsetMapper).
    pub fn header_offset(&self) -> Option<u64> {
        self.header_offset
    }

    /// Returns whether or not the entry represents a directory.
    pub fn dir(&self) -> bool {
        self.filename.as_bytes().last() == Some(&b'/')
    }

    /// Returns the entry's filename for display and table lookups.
    pub(crate) fn key(&self) -> String {
        self.filename.to_string_lossy().into_owned()
    }

    /// Sets the entry's CRC32 value.
    pub fn set_crc32(&mut self, crc32: Option<u32>) {
        self.crc32 = crc32;
    }

    /// Sets the entry's uncompressed size.
    pub fn set_uncompressed_size(&mut self, size: Option<u64>) {
        self.uncompressed_size = size;
    }

    /// Sets the entry's compressed size.
    pub fn set_compressed_size(&mut self, size: Option<u64>) {
        self.compressed_size = size;
    }

    /// Sets the entry's compression method.
    pub fn set_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }

    /// Sets the entry's last modification time & date.
    pub fn set_last_modification_date(&mut self, date: ZipDateTime) {
        self.last_modification_date = date;
    }

    /// Sets the entry's extra fields.
    pub fn set_extra_fields(&mut self, extra_fields: Vec<ExtraField>) {
        self.extra_fields = extra_fields;
    }

    /// Sets the entry's file comment.
    pub fn set_comment(&mut self, comment: ZipString) {
        self.comment = comment;
    }
}
