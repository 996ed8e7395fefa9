// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};

use std::borrow::Cow;

use encoding_rs::Encoding;

/// A string encoding supported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    Raw,
}

/// A string wrapper for handling different encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipString {
    encoding: StringEncoding,
    raw: Vec<u8>,
    alternative: Option<Vec<u8>>,
}

impl ZipString {
    /// Constructs a new encoded string from its raw bytes and its encoding type.
    ///
    /// # Note
    /// If the provided encoding is [`StringEncoding::Utf8`] but the raw bytes are not valid UTF-8 (ie. a call to
    /// `std::str::from_utf8()` fails), the encoding is defaulted back to [`StringEncoding::Raw`].
    pub fn new(raw: Vec<u8>, mut encoding: StringEncoding) -> Self {
        if let StringEncoding::Utf8 = encoding {
            if std::str::from_utf8(&raw).is_err() {
                encoding = StringEncoding::Raw;
            }
        }

        Self { encoding, raw, alternative: None }
    }

    /// Constructs a new UTF-8 string which was decoded from an alternative, legacy-encoded representation.
    ///
    /// The alternative bytes are what was (or will be) stored in the archive.
    pub fn new_with_alternative(string: String, alternative: Vec<u8>) -> Self {
        Self { encoding: StringEncoding::Utf8, raw: string.into_bytes(), alternative: Some(alternative) }
    }

    /// Decodes a name or comment read from an archive.
    ///
    /// If the UTF-8 flag was set the bytes are taken as UTF-8. Otherwise the configured legacy encoding is applied, and
    /// without one, ASCII is accepted as UTF-8 and anything else is kept as raw bytes.
    pub(crate) fn decode(basic: Vec<u8>, basic_is_utf8: bool, legacy: Option<&'static Encoding>) -> Self {
        if basic_is_utf8 || basic.is_ascii() {
            return ZipString::new(basic, StringEncoding::Utf8);
        }

        match legacy {
            Some(encoding) => {
                let (decoded, _, _) = encoding.decode(&basic);
                ZipString::new_with_alternative(decoded.into_owned(), basic)
            }
            // Do not treat as UTF-8 if UTF-8 flags are not set,
            // some string in MBCS may be valid UTF-8 in form, but they are not in truth.
            None => ZipString::new(basic, StringEncoding::Raw),
        }
    }

    /// Returns the raw bytes for this string.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Returns the encoding type for this string.
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Returns the alternative bytes (in a legacy encoding) for this string, if any.
    pub fn alternative(&self) -> Option<&[u8]> {
        self.alternative.as_deref()
    }

    /// Returns the bytes which represent this string inside an archive.
    pub(crate) fn stored_bytes(&self) -> &[u8] {
        self.alternative().unwrap_or(&self.raw)
    }

    /// Returns whether this string must be flagged as UTF-8 when written to an archive.
    pub(crate) fn requires_utf8_flag(&self) -> bool {
        self.alternative.is_none() && self.encoding == StringEncoding::Utf8 && !self.raw.is_ascii()
    }

    /// Returns the raw bytes converted into a string slice.
    ///
    /// # Note
    /// A call to this method will only succeed if the encoding type is [`StringEncoding::Utf8`].
    pub fn as_str(&self) -> Result<&str> {
        if !matches!(self.encoding, StringEncoding::Utf8) {
            return Err(ZipError::StringNotUtf8);
        }

        std::str::from_utf8(&self.raw).map_err(|_| ZipError::StringNotUtf8)
    }

    /// Returns the raw bytes converted to an owned string.
    ///
    /// # Note
    /// A call to this method will only succeed if the encoding type is [`StringEncoding::Utf8`].
    pub fn into_string(self) -> Result<String> {
        if !matches!(self.encoding, StringEncoding::Utf8) {
            return Err(ZipError::StringNotUtf8);
        }

        String::from_utf8(self.raw).map_err(|_| ZipError::StringNotUtf8)
    }

    /// Returns this string for display or lookup, replacing any invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// Returns whether this string is empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl From<String> for ZipString {
    fn from(value: String) -> Self {
        Self { encoding: StringEncoding::Utf8, raw: value.into_bytes(), alternative: None }
    }
}

impl From<&str> for ZipString {
    fn from(value: &str) -> Self {
        Self { encoding: StringEncoding::Utf8, raw: value.as_bytes().to_vec(), alternative: None }
    }
}

impl Default for ZipString {
    fn default() -> Self {
        String::new().into()
    }
}
