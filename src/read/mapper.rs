// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};

/// Translates offsets recorded in an archive into positions within its source.
///
/// Archives which were prepended with other data (such as self-extracting executables) often still record offsets
/// relative to the start of the archive itself rather than the start of the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OffsetMapper {
    /// Recorded offsets are source positions.
    #[default]
    Identity,
    /// Recorded offsets are short of source positions by a constant.
    Shifted(u64),
}

impl OffsetMapper {
    pub(crate) fn from_shift(shift: u64) -> Self {
        match shift {
            0 => OffsetMapper::Identity,
            shift => OffsetMapper::Shifted(shift),
        }
    }

    /// Maps a recorded offset to its position within the source.
    pub fn map(&self, recorded: u64) -> Result<u64> {
        match self {
            OffsetMapper::Identity => Ok(recorded),
            OffsetMapper::Shifted(shift) => {
                recorded.checked_add(*shift).ok_or(ZipError::InvalidArchive("mapped offset overflows"))
            }
        }
    }

    /// Returns the constant added to recorded offsets.
    pub fn shift(&self) -> u64 {
        match self {
            OffsetMapper::Identity => 0,
            OffsetMapper::Shifted(shift) => *shift,
        }
    }
}
