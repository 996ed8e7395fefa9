// Copyright (c) 2021-2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! # mountzip
//!
//! A ZIP archive reading/writing crate for archives which are mounted and shared between threads.
//!
//! ## Features
//! - Central directory discovery tolerant of preambles (eg. self-extracting stubs), postambles and wrapped legacy
//!   entry counts, with full Zip64 support.
//! - Checked and unchecked entry streams, decompressed or raw, backed by a pool of reusable decompressors.
//! - A sequential writer which decides between legacy and Zip64 layouts per record.
//! - A [`ResourceAccountant`](resource::ResourceAccountant) which tracks every open entry stream, so that an archive
//!   can be safely rewritten or closed while other threads may still be reading from it.
//! - Aims for reasonable [specification](https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT) compliance.
//!
//! ## Supported compression codecs
//! - Stored
//! - Deflate
//!
//! ## Example
//! ```
//! # use mountzip::{Compression, ZipEntryBuilder};
//! # use mountzip::read::ZipArchive;
//! # use mountzip::write::ZipFileWriter;
//! # use mountzip::error::ZipError;
//! #
//! # fn run() -> Result<(), ZipError> {
//! let mut writer = ZipFileWriter::new(Vec::new());
//! let builder = ZipEntryBuilder::new("foo.txt".into(), Compression::Deflate);
//! writer.write_entry_whole(builder, b"Hello, world!")?;
//! let bytes = writer.close()?;
//!
//! let archive = ZipArchive::open(bytes)?;
//! let mut data = Vec::new();
//! archive.reader("foo.txt")?.read_to_end_checked(&mut data)?;
//! assert_eq!(data, b"Hello, world!");
//! #   Ok(())
//! # }
//! # run().unwrap();
//! ```

pub mod chain;
pub mod error;
pub mod opts;
pub mod pool;
pub mod read;
pub mod resource;
pub mod spec;
pub mod write;

pub(crate) mod date;
pub(crate) mod entry;
pub(crate) mod file;
pub(crate) mod string;

pub use crate::spec::attribute::AttributeCompatibility;
pub use crate::spec::compression::{Compression, DeflateOption};

pub use crate::date::{builder::ZipDateTimeBuilder, ZipDateTime};
pub use crate::entry::{builder::ZipEntryBuilder, ZipEntry};
pub use crate::file::ZipFile;
pub use crate::string::{StringEncoding, ZipString};

#[cfg(test)]
pub(crate) mod tests;
