// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::spec::codec::{get_u16, FieldReader};
use crate::spec::header::{ExtraField, HeaderId, UnknownExtraField, Zip64ExtendedInformationExtraField};

/// Which fields of the owning record were saturated and therefore live in the Zip64 extra field.
///
/// The order of values inside the extra field is fixed; a value is only present if its counterpart in the owning
/// record holds the sentinel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Zip64Presence {
    pub uncompressed_size: bool,
    pub compressed_size: bool,
    pub relative_header_offset: bool,
    pub disk_start_number: bool,
}

impl Zip64Presence {
    fn any(&self) -> bool {
        self.uncompressed_size || self.compressed_size || self.relative_header_offset || self.disk_start_number
    }
}

pub(crate) trait ExtraFieldAsBytes {
    fn as_bytes(&self) -> Vec<u8>;

    fn count_bytes(&self) -> usize;
}

impl ExtraFieldAsBytes for &[ExtraField] {
    fn as_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.count_bytes());
        for field in self.iter() {
            buffer.append(&mut field.as_bytes());
        }
        buffer
    }

    fn count_bytes(&self) -> usize {
        self.iter().map(|field| field.count_bytes()).sum()
    }
}

impl ExtraFieldAsBytes for Vec<ExtraField> {
    fn as_bytes(&self) -> Vec<u8> {
        self.as_slice().as_bytes()
    }

    fn count_bytes(&self) -> usize {
        self.as_slice().count_bytes()
    }
}

impl ExtraField {
    pub(crate) fn header_id(&self) -> HeaderId {
        match self {
            ExtraField::Zip64ExtendedInformation(_) => HeaderId::ZIP64_EXTENDED_INFORMATION_EXTRA_FIELD,
            ExtraField::Unknown(field) => field.header_id,
        }
    }

    fn content(&self) -> Vec<u8> {
        match self {
            ExtraField::Zip64ExtendedInformation(field) => field.content(),
            ExtraField::Unknown(field) => field.content.clone(),
        }
    }

    fn as_bytes(&self) -> Vec<u8> {
        let content = self.content();
        let mut bytes = Vec::with_capacity(4 + content.len());
        bytes.extend_from_slice(&u16::from(self.header_id()).to_le_bytes());
        bytes.extend_from_slice(&(content.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&content);
        bytes
    }

    fn count_bytes(&self) -> usize {
        4 + match self {
            ExtraField::Zip64ExtendedInformation(field) => field.content_size(),
            ExtraField::Unknown(field) => field.content.len(),
        }
    }
}

impl Zip64ExtendedInformationExtraField {
    fn content_size(&self) -> usize {
        self.uncompressed_size.map(|_| 8).unwrap_or_default()
            + self.compressed_size.map(|_| 8).unwrap_or_default()
            + self.relative_header_offset.map(|_| 8).unwrap_or_default()
            + self.disk_start_number.map(|_| 4).unwrap_or_default()
    }

    fn content(&self) -> Vec<u8> {
        let mut content = Vec::with_capacity(self.content_size());
        if let Some(uncompressed_size) = self.uncompressed_size {
            content.extend_from_slice(&uncompressed_size.to_le_bytes());
        }
        if let Some(compressed_size) = self.compressed_size {
            content.extend_from_slice(&compressed_size.to_le_bytes());
        }
        if let Some(relative_header_offset) = self.relative_header_offset {
            content.extend_from_slice(&relative_header_offset.to_le_bytes());
        }
        if let Some(disk_start_number) = self.disk_start_number {
            content.extend_from_slice(&disk_start_number.to_le_bytes());
        }
        content
    }

    fn from_content(content: &[u8], presence: Zip64Presence) -> Result<Self> {
        let mut fields = FieldReader::new(content);
        let mut field = Self::default();

        if presence.uncompressed_size {
            field.uncompressed_size = Some(take_u64(&mut fields)?);
        }
        if presence.compressed_size {
            field.compressed_size = Some(take_u64(&mut fields)?);
        }
        if presence.relative_header_offset {
            field.relative_header_offset = Some(take_u64(&mut fields)?);
        }
        if presence.disk_start_number {
            if fields.remaining() < 4 {
                return Err(ZipError::Zip64ExtendedFieldIncomplete);
            }
            field.disk_start_number = Some(fields.u32());
        }

        Ok(field)
    }
}

fn take_u64(fields: &mut FieldReader<'_>) -> Result<u64> {
    if fields.remaining() < 8 {
        return Err(ZipError::Zip64ExtendedFieldIncomplete);
    }
    Ok(fields.u64())
}

/// Parse a raw extra field block into its component fields.
///
/// A Zip64 extended information field is only interpreted when the owning record marks at least one field as
/// saturated. Otherwise it is kept verbatim alongside any other unknown fields.
pub(crate) fn parse_extra_fields(data: &[u8], presence: Zip64Presence) -> Result<Vec<ExtraField>> {
    let mut cursor = 0;
    let mut extra_fields = Vec::new();

    while cursor + 4 <= data.len() {
        let header_id = HeaderId(get_u16(data, cursor));
        let data_size = get_u16(data, cursor + 2) as usize;
        cursor += 4;

        let content = data.get(cursor..cursor + data_size).ok_or(ZipError::InvalidExtraField)?;
        cursor += data_size;

        let field = match header_id {
            HeaderId::ZIP64_EXTENDED_INFORMATION_EXTRA_FIELD if presence.any() => ExtraField::Zip64ExtendedInformation(
                Zip64ExtendedInformationExtraField::from_content(content, presence)?,
            ),
            header_id => ExtraField::Unknown(UnknownExtraField { header_id, content: content.to_vec() }),
        };
        extra_fields.push(field);
    }

    // Some writers pad the extra field block; a trailing fragment shorter than a field header carries no data.
    Ok(extra_fields)
}

pub(crate) fn get_zip64_extra_field(extra_fields: &[ExtraField]) -> Option<&Zip64ExtendedInformationExtraField> {
    extra_fields.iter().find_map(|field| match field {
        ExtraField::Zip64ExtendedInformation(zip64) => Some(zip64),
        _ => None,
    })
}

/// Returns the given extra fields with any Zip64 extended information removed.
///
/// Writers emit their own Zip64 field per record, so any field carried over from a previously read entry is stale.
pub(crate) fn without_zip64(extra_fields: &[ExtraField]) -> Vec<ExtraField> {
    extra_fields
        .iter()
        .filter(|field| field.header_id() != HeaderId::ZIP64_EXTENDED_INFORMATION_EXTRA_FIELD)
        .cloned()
        .collect()
}
