// Copyright (c) 2022-2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports reading ZIP files.
//!
//! An archive is opened once through [`ZipArchive`], which resolves the central directory into an in-memory table of
//! entries. Entry data is then streamed through [`ZipEntryReader`]s, which may be used from several threads at once.
//!
//! # Example
//! ```no_run
//! # use mountzip::read::ZipArchive;
//! # use mountzip::error::ZipError;
//! # use std::io::Read;
//! #
//! # fn run() -> Result<(), ZipError> {
//! let archive = ZipArchive::open(std::fs::File::open("foo.zip")?)?;
//!
//! let mut reader = archive.reader("foo.txt")?;
//! let mut data = Vec::new();
//! reader.read_to_end_checked(&mut data)?;
//! #   Ok(())
//! # }
//! ```

pub mod archive;
pub(crate) mod io;
pub(crate) mod locator;
pub mod mapper;
pub mod source;

pub use archive::ZipArchive;
pub use io::entry::ZipEntryReader;
pub use mapper::OffsetMapper;
pub use source::{ReadAt, SerializedSource};

use crate::date::ZipDateTime;
use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::file::ZipFile;
use crate::opts::ReadOptions;
use crate::read::io::bounded::BoundedReader;
use crate::read::locator::Locator;
use crate::spec::codec::get_u32;
use crate::spec::compression::{Compression, DeflateOption};
use crate::spec::consts::{
    CDH_SIGNATURE, EOCDR_LENGTH, EOCDR_SIGNATURE, LEGACY_COUNT_MODULUS, LFH_SIGNATURE, NON_ZIP64_MAX_NUM_FILES,
    NON_ZIP64_MAX_SIZE, SIGNATURE_LENGTH, ZIP64_EOCDL_LENGTH, ZIP64_EOCDL_SIGNATURE, ZIP64_EOCDR_LENGTH,
    ZIP64_EOCDR_SIGNATURE,
};
use crate::spec::extra_field::{get_zip64_extra_field, parse_extra_fields, Zip64Presence};
use crate::spec::header::{
    CentralDirectoryRecord, EndOfCentralDirectoryHeader, Zip64EndOfCentralDirectoryLocator,
    Zip64EndOfCentralDirectoryRecord,
};
use crate::string::ZipString;

use std::collections::HashMap;
use std::io::{BufReader, Read};

use encoding_rs::Encoding;

/// The max buffer size used when parsing the central directory, equal to 20MiB.
const MAX_CD_BUFFER_SIZE: u64 = 20 * 1024 * 1024;

const EOCDR_TOTAL_LENGTH: u64 = (SIGNATURE_LENGTH + EOCDR_LENGTH) as u64;
const ZIP64_EOCDL_TOTAL_LENGTH: u64 = (SIGNATURE_LENGTH + ZIP64_EOCDL_LENGTH) as u64;
const ZIP64_EOCDR_TOTAL_LENGTH: u64 = (SIGNATURE_LENGTH + ZIP64_EOCDR_LENGTH) as u64;

/// The location of the central directory as declared by the trailer records.
#[derive(Debug)]
struct Directory {
    declared_entries: u64,
    offset: u64,
    mapper: OffsetMapper,
    zip64: bool,
}

/// Resolves the central directory of an archive.
pub(crate) fn file<S: ReadAt + ?Sized>(source: &S, options: &ReadOptions) -> Result<ZipFile> {
    let length = source.size()?;

    if !options.allow_preamble {
        check_leading_signature(source, length)?;
    }

    let mut locator = Locator::new(source, length, options.allow_postamble);
    loop {
        let position = locator.next_candidate()?.ok_or(ZipError::UnableToLocateEOCDR)?;
        tracing::trace!(position, "found EOCDR candidate");

        if let Some(file) = resolve(source, length, position, options)? {
            return Ok(file);
        }
    }
}

fn check_leading_signature<S: ReadAt + ?Sized>(source: &S, length: u64) -> Result<()> {
    if length < SIGNATURE_LENGTH as u64 {
        return Err(ZipError::UnableToLocateEOCDR);
    }

    let mut buffer = [0; SIGNATURE_LENGTH];
    source.read_exact_at(&mut buffer, 0)?;

    match u32::from_le_bytes(buffer) {
        LFH_SIGNATURE | EOCDR_SIGNATURE | ZIP64_EOCDR_SIGNATURE => Ok(()),
        _ => Err(ZipError::InvalidArchive("data precedes the first local file header")),
    }
}

/// Attempts to resolve the directory from the EOCDR candidate at `position`.
///
/// Returns `None` if the candidate is inconsistent with its surroundings and the search should continue.
fn resolve<S: ReadAt + ?Sized>(
    source: &S,
    length: u64,
    position: u64,
    options: &ReadOptions,
) -> Result<Option<ZipFile>> {
    let mut buffer = [0; EOCDR_LENGTH];
    source.read_exact_at(&mut buffer, position + SIGNATURE_LENGTH as u64)?;
    let eocdr = EndOfCentralDirectoryHeader::from(buffer);

    let end = position + EOCDR_TOTAL_LENGTH + u64::from(eocdr.file_comm_length);
    if end > length {
        tracing::trace!(position, "EOCDR candidate's comment overruns the end of the data");
        return Ok(None);
    }

    let directory = match zip64_directory(source, length, position)? {
        Some(directory) => directory,
        None => match legacy_directory(&eocdr, position)? {
            Some(directory) => directory,
            None => return Ok(None),
        },
    };

    let comment = read_bytes(source, position + EOCDR_TOTAL_LENGTH, eocdr.file_comm_length.into())?;
    let comment = ZipString::decode(comment, false, options.legacy_encoding);

    let start = directory.mapper.map(directory.offset)?;
    let directory_end = if directory.zip64 { position - ZIP64_EOCDL_TOTAL_LENGTH } else { position };
    let directory_length =
        directory_end.checked_sub(start).ok_or(ZipError::InvalidArchive("central directory lies beyond its trailer"))?;

    let mut file = ZipFile {
        entries: Vec::new(),
        index: HashMap::new(),
        comment,
        zip64: directory.zip64,
        preamble: start,
        postamble: length - end,
        mapper: directory.mapper,
        length,
    };

    let capacity = directory_length.clamp(1, MAX_CD_BUFFER_SIZE) as usize;
    let mut reader = BufReader::with_capacity(capacity, BoundedReader::new(source, start, directory_length));
    let mut parsed = 0u64;

    while let Some(signature) = try_read_signature(&mut reader)? {
        if signature != CDH_SIGNATURE {
            break;
        }

        let entry = cd_record(&mut reader, options.legacy_encoding)?;
        let header_offset = directory.mapper.map(entry.header_offset.unwrap_or_default())?;
        file.preamble = file.preamble.min(header_offset);
        file.insert(entry);
        parsed += 1;
    }

    check_entry_count(directory.declared_entries, parsed, directory.zip64)?;

    tracing::debug!(
        entries = file.entries.len(),
        preamble = file.preamble,
        postamble = file.postamble,
        zip64 = file.zip64,
        "resolved central directory"
    );

    Ok(Some(file))
}

/// Reads the Zip64 trailer records which precede the EOCDR at `position`, if present.
fn zip64_directory<S: ReadAt + ?Sized>(source: &S, length: u64, position: u64) -> Result<Option<Directory>> {
    let Some(locator_position) = position.checked_sub(ZIP64_EOCDL_TOTAL_LENGTH) else {
        return Ok(None);
    };

    let mut buffer = [0; ZIP64_EOCDL_TOTAL_LENGTH as usize];
    source.read_exact_at(&mut buffer, locator_position)?;
    if get_u32(&buffer, 0) != ZIP64_EOCDL_SIGNATURE {
        return Ok(None);
    }

    let mut fields = [0; ZIP64_EOCDL_LENGTH];
    fields.copy_from_slice(&buffer[SIGNATURE_LENGTH..]);
    let locator = Zip64EndOfCentralDirectoryLocator::from(fields);

    if locator.total_number_of_disks > 1 || locator.number_of_disk_with_start_of_zip64_end_of_central_directory != 0 {
        return Err(ZipError::FeatureNotSupported("spanned/split archives"));
    }

    // Prefer the record where the locator says it is; failing that, one directly before the locator means the
    // archive was moved behind a preamble without its offsets being adjusted.
    let (record, shift) = match read_zip64_record(source, length, locator.relative_offset)? {
        Some(record) => (record, 0),
        None => {
            let Some(actual) = locator_position.checked_sub(ZIP64_EOCDR_TOTAL_LENGTH) else {
                return Ok(None);
            };
            match (read_zip64_record(source, length, actual)?, actual.checked_sub(locator.relative_offset)) {
                (Some(record), Some(shift)) => (record, shift),
                _ => {
                    tracing::warn!(position, "ignoring inconsistent Zip64 end of central directory locator");
                    return Ok(None);
                }
            }
        }
    };

    if record.disk_number != 0
        || record.disk_number_start_of_cd != 0
        || record.num_entries_in_directory_on_disk != record.num_entries_in_directory
    {
        return Err(ZipError::FeatureNotSupported("spanned/split archives"));
    }

    Ok(Some(Directory {
        declared_entries: record.num_entries_in_directory,
        offset: record.offset_of_start_of_directory,
        mapper: OffsetMapper::from_shift(shift),
        zip64: true,
    }))
}

fn read_zip64_record<S: ReadAt + ?Sized>(
    source: &S,
    length: u64,
    position: u64,
) -> Result<Option<Zip64EndOfCentralDirectoryRecord>> {
    if position.checked_add(ZIP64_EOCDR_TOTAL_LENGTH).map_or(true, |end| end > length) {
        return Ok(None);
    }

    let mut buffer = [0; ZIP64_EOCDR_TOTAL_LENGTH as usize];
    source.read_exact_at(&mut buffer, position)?;
    if get_u32(&buffer, 0) != ZIP64_EOCDR_SIGNATURE {
        return Ok(None);
    }

    let mut fields = [0; ZIP64_EOCDR_LENGTH];
    fields.copy_from_slice(&buffer[SIGNATURE_LENGTH..]);
    Ok(Some(Zip64EndOfCentralDirectoryRecord::from(fields)))
}

/// Derives the directory location from the legacy EOCDR alone.
///
/// The directory is assumed to end where the EOCDR begins, so any difference between that and the recorded offset
/// is the length of a preamble which the recorded offsets don't account for.
fn legacy_directory(eocdr: &EndOfCentralDirectoryHeader, position: u64) -> Result<Option<Directory>> {
    if eocdr.disk_num != 0 || eocdr.start_cent_dir_disk != 0 || eocdr.num_of_entries_disk != eocdr.num_of_entries {
        return Err(ZipError::FeatureNotSupported("spanned/split archives"));
    }

    let Some(start) = position.checked_sub(eocdr.size_cent_dir.into()) else {
        tracing::trace!(position, "EOCDR candidate declares a directory larger than the preceding data");
        return Ok(None);
    };
    let Some(shift) = start.checked_sub(eocdr.cent_dir_offset.into()) else {
        tracing::trace!(position, "EOCDR candidate declares a directory offset past its own position");
        return Ok(None);
    };

    Ok(Some(Directory {
        declared_entries: eocdr.num_of_entries.into(),
        offset: eocdr.cent_dir_offset.into(),
        mapper: OffsetMapper::from_shift(shift),
        zip64: false,
    }))
}

/// Cross-checks the number of parsed records against the declared count.
///
/// Writers which don't emit Zip64 trailers let the 16-bit legacy count wrap, so without a Zip64 trailer the two
/// only need to agree modulo 65536.
pub(crate) fn check_entry_count(declared: u64, actual: u64, zip64: bool) -> Result<()> {
    let consistent = if zip64 {
        declared == actual
    } else {
        actual >= declared && (actual - declared) % LEGACY_COUNT_MODULUS == 0
    };

    if !consistent {
        return Err(ZipError::EntryCountMismatch { declared, actual });
    }
    Ok(())
}

fn try_read_signature<R: Read>(reader: &mut R) -> Result<Option<u32>> {
    let mut buffer = [0; SIGNATURE_LENGTH];
    let mut filled = 0;

    while filled < SIGNATURE_LENGTH {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => return Ok(None),
            Ok(read) => filled += read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err.into()),
        }
    }

    Ok(Some(u32::from_le_bytes(buffer)))
}

fn read_bytes<S: ReadAt + ?Sized>(source: &S, position: u64, length: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0; length];
    source.read_exact_at(&mut buffer, position)?;
    Ok(buffer)
}

fn read_vec<R: Read>(reader: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0; length];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

pub(crate) fn cd_record<R: Read>(reader: &mut R, legacy: Option<&'static Encoding>) -> Result<ZipEntry> {
    let header = CentralDirectoryRecord::from_reader(reader)?;
    let filename = read_vec(reader, header.file_name_length.into())?;
    let filename = ZipString::decode(filename, header.flags.filename_unicode, legacy);

    let name = filename.to_string_lossy().into_owned();
    cd_record_body(reader, header, filename, legacy).map_err(|err| err.with_entry(name))
}

fn cd_record_body<R: Read>(
    reader: &mut R,
    header: CentralDirectoryRecord,
    filename: ZipString,
    legacy: Option<&'static Encoding>,
) -> Result<ZipEntry> {
    let compression = Compression::try_from(header.compression)?;

    let presence = Zip64Presence {
        uncompressed_size: header.uncompressed_size == NON_ZIP64_MAX_SIZE,
        compressed_size: header.compressed_size == NON_ZIP64_MAX_SIZE,
        relative_header_offset: header.lh_offset == NON_ZIP64_MAX_SIZE,
        disk_start_number: header.disk_start == NON_ZIP64_MAX_NUM_FILES,
    };
    let extra_fields = read_vec(reader, header.extra_field_length.into())?;
    let extra_fields = parse_extra_fields(&extra_fields, presence)?;

    let comment = read_vec(reader, header.file_comment_length.into())?;
    let comment = ZipString::decode(comment, header.flags.filename_unicode, legacy);

    let zip64 = get_zip64_extra_field(&extra_fields).cloned().unwrap_or_default();
    let widen = |narrow: u32, wide: Option<u64>| match narrow {
        NON_ZIP64_MAX_SIZE => wide.ok_or(ZipError::Zip64ExtendedFieldIncomplete),
        narrow => Ok(u64::from(narrow)),
    };

    let uncompressed_size = widen(header.uncompressed_size, zip64.uncompressed_size)?;
    let compressed_size = widen(header.compressed_size, zip64.compressed_size)?;
    let header_offset = widen(header.lh_offset, zip64.relative_header_offset)?;
    let disk_start = match header.disk_start {
        NON_ZIP64_MAX_NUM_FILES => zip64.disk_start_number.ok_or(ZipError::Zip64ExtendedFieldIncomplete)?,
        disk => u32::from(disk),
    };
    if disk_start != 0 {
        return Err(ZipError::FeatureNotSupported("spanned/split archives"));
    }

    Ok(ZipEntry {
        filename,
        compression,
        compression_level: DeflateOption::default(),
        crc32: Some(header.crc),
        uncompressed_size: Some(uncompressed_size),
        compressed_size: Some(compressed_size),
        attribute_compatibility: ((header.v_made_by >> 8) as u8).into(),
        last_modification_date: ZipDateTime::from_raw(header.mod_date, header.mod_time),
        internal_file_attribute: header.inter_attr,
        external_file_attribute: header.exter_attr,
        flags: header.flags,
        extra_fields,
        comment,
        header_offset: Some(header_offset),
    })
}
