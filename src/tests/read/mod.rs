// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod count;
pub(crate) mod encoding;
pub(crate) mod locator;
pub(crate) mod preamble;
pub(crate) mod unsupported;
pub(crate) mod zip64;

use crate::spec::consts::{EOCDR_SIGNATURE, SIGNATURE_LENGTH};

/// Returns the position of the last EOCDR signature in the data.
pub(crate) fn eocdr_position(data: &[u8]) -> usize {
    crate::read::locator::reverse_search_buffer(data, &EOCDR_SIGNATURE.to_le_bytes()).expect("no EOCDR signature")
}

/// Returns the offset of a little-endian field inside the EOCDR, relative to the start of the data.
pub(crate) fn eocdr_field(data: &[u8], field_offset: usize) -> usize {
    eocdr_position(data) + SIGNATURE_LENGTH + field_offset
}
