// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

/// The host system an entry was created on, as recorded in the upper byte of "version made by".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeCompatibility {
    Dos,
    #[default]
    Unix,
    Other(u8),
}

impl From<u8> for AttributeCompatibility {
    // Convert a host code into an attribute host compatibility.
    // https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4422
    fn from(value: u8) -> Self {
        match value {
            0 => AttributeCompatibility::Dos,
            3 => AttributeCompatibility::Unix,
            other => AttributeCompatibility::Other(other),
        }
    }
}

impl From<AttributeCompatibility> for u8 {
    fn from(compatibility: AttributeCompatibility) -> Self {
        match compatibility {
            AttributeCompatibility::Dos => 0,
            AttributeCompatibility::Unix => 3,
            AttributeCompatibility::Other(other) => other,
        }
    }
}
