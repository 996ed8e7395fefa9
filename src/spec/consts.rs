// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub const SIGNATURE_LENGTH: usize = 4;

// Local file header constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#437
pub const LFH_SIGNATURE: u32 = 0x4034b50;
pub const LFH_LENGTH: usize = 26;

// Central directory header constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4312
pub const CDH_SIGNATURE: u32 = 0x2014b50;
pub const CDH_LENGTH: usize = 42;

// End of central directory record constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316
pub const EOCDR_SIGNATURE: u32 = 0x6054b50;
pub const EOCDR_LENGTH: usize = 18;

// Zip64 end of central directory record & locator constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4314
pub const ZIP64_EOCDR_SIGNATURE: u32 = 0x06064b50;
pub const ZIP64_EOCDR_LENGTH: usize = 52;
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4315
pub const ZIP64_EOCDL_SIGNATURE: u32 = 0x07064b50;
pub const ZIP64_EOCDL_LENGTH: usize = 16;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#439
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x8074b50;
pub const DATA_DESCRIPTOR_LENGTH: usize = 12;
pub const ZIP64_DATA_DESCRIPTOR_LENGTH: usize = 20;

/// The largest value a 32-bit size or offset field can hold before it must be moved into a Zip64 record.
///
/// The value itself is reserved as the "see Zip64 record" sentinel.
pub const NON_ZIP64_MAX_SIZE: u32 = 0xFFFFFFFF;
pub const NON_ZIP64_MAX_NUM_FILES: u16 = 0xFFFF;

/// The legacy entry count field wraps at this modulus in archives written without Zip64 trailers.
pub const LEGACY_COUNT_MODULUS: u64 = 1 << 16;

/// Flag bits of the general purpose bit flag.
///
/// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#444
pub const FLAG_ENCRYPTED: u16 = 0x1;
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x8;
pub const FLAG_UTF8: u16 = 0x800;
