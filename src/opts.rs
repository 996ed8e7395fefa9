// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Options which control how archives are opened, rewritten and closed.

use std::time::Duration;

use encoding_rs::Encoding;

/// Options used when resolving the central directory of an archive.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub(crate) legacy_encoding: Option<&'static Encoding>,
    pub(crate) allow_preamble: bool,
    pub(crate) allow_postamble: bool,
    pub(crate) pool_capacity: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions { legacy_encoding: None, allow_preamble: true, allow_postamble: false, pool_capacity: 16 }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encoding used for names and comments which are not flagged as UTF-8.
    pub fn legacy_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.legacy_encoding = Some(encoding);
        self
    }

    /// Sets whether unknown bytes may precede the first local file header.
    pub fn allow_preamble(mut self, allow: bool) -> Self {
        self.allow_preamble = allow;
        self
    }

    /// Sets whether the trailer search may extend past the maximum comment length.
    ///
    /// This makes the search unbounded and thus linear in the size of the archive.
    pub fn allow_postamble(mut self, allow: bool) -> Self {
        self.allow_postamble = allow;
        self
    }

    /// Sets how many idle decompressors the archive's pool keeps.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }
}

/// What to do with other threads' streams that are still open once a wait has timed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BusyPolicy {
    /// Fail with [`ZipError::Busy`](crate::error::ZipError::Busy) and leave the streams alone.
    #[default]
    Fail,
    /// Forcibly close the remaining streams; they fail any further I/O.
    ForceClose,
}

/// Options for operations which require exclusive use of an archive.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub(crate) timeout: Duration,
    pub(crate) policy: BusyPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions { timeout: Duration::ZERO, policy: BusyPolicy::Fail }
    }
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long to wait for other threads to close their streams.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(mut self, policy: BusyPolicy) -> Self {
        self.policy = policy;
        self
    }
}
