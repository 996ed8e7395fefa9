// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Collection of failures from operations which continue past individual errors.
//!
//! ```
//! # use mountzip::chain::SequentialErrors;
//! # use mountzip::error::ZipError;
//! let mut errors = SequentialErrors::new();
//! errors.push(ZipError::Busy { resources: 1 });
//! errors.push(ZipError::CRC32CheckError { expected: 1, actual: 2 });
//!
//! let chain = errors.into_chain().unwrap();
//! assert!(matches!(chain.first(), ZipError::CRC32CheckError { .. }));
//! ```

use crate::error::{Result, ZipError};

use std::fmt;

/// One failure inside an [`ErrorChain`].
#[derive(Debug)]
pub struct ChainedError {
    priority: i32,
    index: usize,
    error: ZipError,
}

impl ChainedError {
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the position at which this failure was collected.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn error(&self) -> &ZipError {
        &self.error
    }

    pub fn into_error(self) -> ZipError {
        self.error
    }
}

/// A non-empty list of failures ranked by priority (highest first), then by order of occurrence.
#[derive(Debug)]
pub struct ErrorChain {
    links: Vec<ChainedError>,
}

impl ErrorChain {
    /// Returns the highest ranked failure.
    pub fn first(&self) -> &ZipError {
        &self.links[0].error
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainedError> {
        self.links.iter()
    }

    pub fn into_errors(self) -> Vec<ZipError> {
        self.links.into_iter().map(ChainedError::into_error).collect()
    }
}

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred", self.links.len())?;
        for link in &self.links {
            write!(f, "; [{}] {}", link.priority, link.error)?;
        }
        Ok(())
    }
}

/// A collector for failures which should not abort the operation producing them.
#[derive(Debug, Default)]
pub struct SequentialErrors {
    links: Vec<ChainedError>,
}

impl SequentialErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects an error ranked by [`ZipError::priority()`].
    pub fn push(&mut self, error: ZipError) {
        let priority = error.priority();
        self.push_with_priority(error, priority);
    }

    pub fn push_with_priority(&mut self, error: ZipError, priority: i32) {
        let index = self.links.len();
        self.links.push(ChainedError { priority, index, error });
    }

    /// Returns the success value, or collects the error and returns `None`.
    pub fn check<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns the ranked chain, or `None` if nothing was collected.
    pub fn into_chain(mut self) -> Option<ErrorChain> {
        if self.links.is_empty() {
            return None;
        }

        // Stable, so equal priorities keep their order of occurrence.
        self.links.sort_by(|a, b| b.priority.cmp(&a.priority));
        Some(ErrorChain { links: self.links })
    }

    /// Surfaces the collected failures.
    ///
    /// A single failure is returned as itself; several are returned as [`ZipError::Sequential`].
    pub fn finish(mut self) -> Result<()> {
        match self.links.len() {
            0 => Ok(()),
            1 => Err(self.links.remove(0).error),
            _ => Err(self.into_chain().map_or(ZipError::InvalidArchive("empty error chain"), ZipError::Sequential)),
        }
    }
}
