// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::entry::ZipEntry;
use crate::spec::attribute::AttributeCompatibility;
use crate::spec::compression::Compression;

pub(crate) const SPEC_VERSION_MADE_BY: u16 = 63;
pub(crate) const ZIP64_VERSION_NEEDED: u16 = 45;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#443
pub(crate) fn as_needed_to_extract(entry: &ZipEntry, zip64: bool) -> u16 {
    let mut version = match entry.compression() {
        Compression::Deflate => 20,
        Compression::Stored => 10,
    };

    if entry.dir() {
        version = std::cmp::max(version, 20);
    }
    if zip64 {
        version = std::cmp::max(version, ZIP64_VERSION_NEEDED);
    }

    version
}

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#442
pub(crate) fn as_made_by(entry: &ZipEntry) -> u16 {
    let host: u8 = entry.attribute_compatibility().into();
    (u16::from(host) << 8) | SPEC_VERSION_MADE_BY
}

/// The version made by for records which aren't tied to an entry, such as the Zip64 end of central directory record.
pub(crate) fn as_archive_made_by() -> u16 {
    let host: u8 = AttributeCompatibility::Unix.into();
    (u16::from(host) << 8) | SPEC_VERSION_MADE_BY
}
