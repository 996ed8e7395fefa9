// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::date::ZipDateTime;
use crate::entry::ZipEntry;
use crate::spec::attribute::AttributeCompatibility;
use crate::spec::compression::{Compression, DeflateOption};
use crate::spec::header::ExtraField;
use crate::string::ZipString;

/// A builder for [`ZipEntry`].
pub struct ZipEntryBuilder(pub(crate) ZipEntry);

impl From<ZipEntry> for ZipEntryBuilder {
    fn from(entry: ZipEntry) -> Self {
        Self(entry)
    }
}

impl ZipEntryBuilder {
    /// Constructs a new builder which defines the raw underlying data of a ZIP entry.
    ///
    /// A filename and compression method are needed to construct the builder as minimal parameters.
    pub fn new(filename: ZipString, compression: Compression) -> Self {
        Self(ZipEntry::new(filename, compression))
    }

    /// Sets the entry's filename.
    pub fn filename(mut self, filename: ZipString) -> Self {
        self.0.filename = filename;
        self
    }

    /// Sets the entry's compression method.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.0.compression = compression;
        self
    }

    /// Set the deflate compression option.
    ///
    /// If the compression type isn't deflate, this option has no effect.
    pub fn deflate_option(mut self, option: DeflateOption) -> Self {
        self.0.compression_level = option;
        self
    }

    /// Sets the entry's CRC32 value.
    ///
    /// Required for stored and pre-compressed entries; see
    /// [`ZipFileWriter::begin_entry()`](crate::write::ZipFileWriter::begin_entry).
    pub fn crc32(mut self, crc32: u32) -> Self {
        self.0.crc32 = Some(crc32);
        self
    }

    /// Sets the entry's uncompressed size.
    pub fn uncompressed_size(mut self, size: u64) -> Self {
        self.0.uncompressed_size = Some(size);
        self
    }

    /// Sets the entry's compressed size.
    pub fn compressed_size(mut self, size: u64) -> Self {
        self.0.compressed_size = Some(size);
        self
    }

    /// Sets the entry's attribute host compatibility.
    pub fn attribute_compatibility(mut self, compatibility: AttributeCompatibility) -> Self {
        self.0.attribute_compatibility = compatibility;
        self
    }

    /// Sets the entry's last modification date.
    pub fn last_modification_date(mut self, date: ZipDateTime) -> Self {
        self.0.last_modification_date = date;
        self
    }

    /// Sets the entry's internal file attribute.
    pub fn internal_file_attribute(mut self, attribute: u16) -> Self {
        self.0.internal_file_attribute = attribute;
        self
    }

    /// Sets the entry's external file attribute.
    pub fn external_file_attribute(mut self, attribute: u32) -> Self {
        self.0.external_file_attribute = attribute;
        self
    }

    /// Sets the entry's extra field data.
    pub fn extra_fields(mut self, extra_fields: Vec<ExtraField>) -> Self {
        self.0.extra_fields = extra_fields;
        self
    }

    /// Sets the entry's file comment.
    pub fn comment(mut self, comment: ZipString) -> Self {
        self.0.comment = comment;
        self
    }

    /// Consumes this builder and returns a final [`ZipEntry`].
    ///
    /// This is equivalent to:
    /// ```
    /// # use mountzip::{ZipEntry, ZipEntryBuilder, Compression};
    /// #
    /// # let builder = ZipEntryBuilder::new(String::from("foo.bar").into(), Compression::Stored);
    /// let entry: ZipEntry = builder.into();
    /// ```
    pub fn build(self) -> ZipEntry {
        self.into()
    }
}
