// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which holds relevant error reporting structures/types.

use crate::chain::ErrorChain;

use std::io;

use thiserror::Error;

/// A Result type alias over ZipError to minimise repetition.
pub type Result<V> = std::result::Result<V, ZipError>;

/// An enum of possible errors and their descriptions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("feature not supported: '{0}'")]
    FeatureNotSupported(&'static str),
    #[error("compression not supported: {0}")]
    CompressionNotSupported(u16),

    #[error("unable to locate the end of central directory record")]
    UnableToLocateEOCDR,
    #[error("Encountered an unexpected header (actual: {0:#x}, expected: {1:#x}).")]
    UnexpectedHeaderError(u32, u32),
    #[error("invalid archive: {0}")]
    InvalidArchive(&'static str),
    #[error("central directory declares {declared} entries but {actual} were found")]
    EntryCountMismatch { declared: u64, actual: u64 },
    #[error("zip64 extended information field was incomplete")]
    Zip64ExtendedFieldIncomplete,
    #[error("an extra field was truncated or malformed")]
    InvalidExtraField,
    #[error("entry '{name}': {source}")]
    Entry {
        name: String,
        #[source]
        source: Box<ZipError>,
    },

    #[error("a computed CRC32 value did not match the expected value (expected: {expected:#x}, actual: {actual:#x})")]
    CRC32CheckError { expected: u32, actual: u32 },
    #[error("the central directory CRC32 ({central:#x}) does not match the local header CRC32 ({local:#x})")]
    HeaderCrcMismatch { central: u32, local: u32 },

    #[error("{resources} resource(s) are still in use")]
    Busy { resources: usize },
    #[error("the resource has been closed")]
    ResourceClosed,
    #[error("{0}")]
    Sequential(ErrorChain),

    #[error("entry '{name}' requires a known {field} before it can be written")]
    MissingEntryMetadata { name: String, field: &'static str },
    #[error("entry '{name}' declared {field} {declared} but {actual} was written")]
    EntryMetadataMismatch { name: String, field: &'static str, declared: u64, actual: u64 },
    #[error("an entry named '{0}' has already been written")]
    DuplicateEntry(String),
    #[error("no entry is currently being written")]
    NoActiveEntry,
    #[error("the writer has already been finished")]
    WriterFinished,
    #[error("file name too large to fit in a u16")]
    FileNameTooLarge,
    #[error("extra fields too large to fit in a u16")]
    ExtraFieldTooLarge,
    #[error("comment too large to fit in a u16")]
    CommentTooLarge,

    #[error("no entry named '{0}' exists")]
    EntryNotFound(String),
    #[error("the wait was interrupted")]
    Interrupted,
    #[error("an upstream reader returned an error: {0}")]
    UpstreamReadError(#[source] io::Error),
    #[error("the string is not valid UTF-8")]
    StringNotUtf8,
}

impl ZipError {
    /// Wraps this error with the name of the entry which caused it.
    pub(crate) fn with_entry(self, name: impl Into<String>) -> Self {
        match self {
            ZipError::Entry { .. } => self,
            other => ZipError::Entry { name: name.into(), source: Box::new(other) },
        }
    }

    /// Returns the priority this error is ranked with inside an [`ErrorChain`].
    ///
    /// Integrity failures rank above everything else, busy conditions below.
    pub fn priority(&self) -> i32 {
        match self {
            ZipError::CRC32CheckError { .. } | ZipError::HeaderCrcMismatch { .. } => 1,
            ZipError::Busy { .. } => -1,
            ZipError::Entry { source, .. } => source.priority(),
            _ => 0,
        }
    }

    /// Returns whether the operation which produced this error may succeed if retried later.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ZipError::Busy { .. } => true,
            ZipError::Sequential(chain) => chain.iter().all(|link| link.error().is_recoverable()),
            _ => false,
        }
    }
}

impl From<io::Error> for ZipError {
    fn from(error: io::Error) -> Self {
        if error.get_ref().map_or(false, |inner| inner.is::<ZipError>()) {
            if let Some(inner) = error.into_inner() {
                if let Ok(zip) = inner.downcast::<ZipError>() {
                    return *zip;
                }
            }
            return ZipError::InvalidArchive("lost error payload");
        }

        ZipError::UpstreamReadError(error)
    }
}

impl From<ZipError> for io::Error {
    fn from(error: ZipError) -> Self {
        let kind = match &error {
            ZipError::UpstreamReadError(inner) => return io::Error::new(inner.kind(), error),
            ZipError::CRC32CheckError { .. } | ZipError::HeaderCrcMismatch { .. } => io::ErrorKind::InvalidData,
            ZipError::ResourceClosed => io::ErrorKind::BrokenPipe,
            ZipError::Interrupted => io::ErrorKind::Interrupted,
            ZipError::EntryNotFound(_) => io::ErrorKind::NotFound,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}
