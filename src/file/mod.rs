// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::entry::ZipEntry;
use crate::read::OffsetMapper;
use crate::string::ZipString;

use std::collections::HashMap;

/// An immutable store of data about a ZIP file, resolved from its central directory.
#[derive(Clone, Debug)]
pub struct ZipFile {
    pub(crate) entries: Vec<ZipEntry>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) comment: ZipString,
    pub(crate) zip64: bool,
    pub(crate) preamble: u64,
    pub(crate) postamble: u64,
    pub(crate) mapper: OffsetMapper,
    pub(crate) length: u64,
}

impl ZipFile {
    /// Adds a resolved entry; a later entry with the same name shadows the earlier one.
    pub(crate) fn insert(&mut self, entry: ZipEntry) {
        match self.index.get(&entry.key()) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.index.insert(entry.key(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Returns a list of this ZIP file's entries.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Looks up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    /// Returns this ZIP file's trailing comment.
    pub fn comment(&self) -> &ZipString {
        &self.comment
    }

    /// Returns whether or not this ZIP file's directory was located through Zip64 records.
    pub fn zip64(&self) -> bool {
        self.zip64
    }

    /// Returns the number of unknown bytes before the first local file header.
    pub fn preamble(&self) -> u64 {
        self.preamble
    }

    /// Returns the number of bytes after the end of central directory record and its comment.
    pub fn postamble(&self) -> u64 {
        self.postamble
    }

    pub fn mapper(&self) -> OffsetMapper {
        self.mapper
    }

    /// Returns the total length of the underlying storage.
    pub fn length(&self) -> u64 {
        self.length
    }
}
