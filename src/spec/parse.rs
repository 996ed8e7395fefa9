// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::Result;
use crate::spec::codec::{array_push, FieldReader};
use crate::spec::consts::{
    CDH_LENGTH, EOCDR_LENGTH, FLAG_DATA_DESCRIPTOR, FLAG_ENCRYPTED, FLAG_UTF8, LFH_LENGTH, ZIP64_EOCDL_LENGTH,
    ZIP64_EOCDR_LENGTH,
};
use crate::spec::header::{
    CentralDirectoryRecord, EndOfCentralDirectoryHeader, GeneralPurposeFlag, LocalFileHeader,
    Zip64EndOfCentralDirectoryLocator, Zip64EndOfCentralDirectoryRecord,
};

use std::io::Read;

impl LocalFileHeader {
    pub fn as_slice(&self) -> [u8; LFH_LENGTH] {
        let mut array = [0; LFH_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.version.to_le_bytes());
        array_push!(array, cursor, self.flags.as_slice());
        array_push!(array, cursor, self.compression.to_le_bytes());
        array_push!(array, cursor, self.mod_time.to_le_bytes());
        array_push!(array, cursor, self.mod_date.to_le_bytes());
        array_push!(array, cursor, self.crc.to_le_bytes());
        array_push!(array, cursor, self.compressed_size.to_le_bytes());
        array_push!(array, cursor, self.uncompressed_size.to_le_bytes());
        array_push!(array, cursor, self.file_name_length.to_le_bytes());
        array_push!(array, cursor, self.extra_field_length.to_le_bytes());

        array
    }
}

impl GeneralPurposeFlag {
    pub fn as_slice(&self) -> [u8; 2] {
        u16::from(*self).to_le_bytes()
    }
}

impl From<GeneralPurposeFlag> for u16 {
    fn from(flags: GeneralPurposeFlag) -> u16 {
        let encrypted = if flags.encrypted { FLAG_ENCRYPTED } else { 0 };
        let data_descriptor = if flags.data_descriptor { FLAG_DATA_DESCRIPTOR } else { 0 };
        let filename_unicode = if flags.filename_unicode { FLAG_UTF8 } else { 0 };

        encrypted | data_descriptor | filename_unicode
    }
}

impl From<u16> for GeneralPurposeFlag {
    fn from(value: u16) -> GeneralPurposeFlag {
        let encrypted = value & FLAG_ENCRYPTED != 0;
        let data_descriptor = value & FLAG_DATA_DESCRIPTOR != 0;
        let filename_unicode = value & FLAG_UTF8 != 0;

        GeneralPurposeFlag { encrypted, data_descriptor, filename_unicode }
    }
}

impl CentralDirectoryRecord {
    pub fn as_slice(&self) -> [u8; CDH_LENGTH] {
        let mut array = [0; CDH_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.v_made_by.to_le_bytes());
        array_push!(array, cursor, self.v_needed.to_le_bytes());
        array_push!(array, cursor, self.flags.as_slice());
        array_push!(array, cursor, self.compression.to_le_bytes());
        array_push!(array, cursor, self.mod_time.to_le_bytes());
        array_push!(array, cursor, self.mod_date.to_le_bytes());
        array_push!(array, cursor, self.crc.to_le_bytes());
        array_push!(array, cursor, self.compressed_size.to_le_bytes());
        array_push!(array, cursor, self.uncompressed_size.to_le_bytes());
        array_push!(array, cursor, self.file_name_length.to_le_bytes());
        array_push!(array, cursor, self.extra_field_length.to_le_bytes());
        array_push!(array, cursor, self.file_comment_length.to_le_bytes());
        array_push!(array, cursor, self.disk_start.to_le_bytes());
        array_push!(array, cursor, self.inter_attr.to_le_bytes());
        array_push!(array, cursor, self.exter_attr.to_le_bytes());
        array_push!(array, cursor, self.lh_offset.to_le_bytes());

        array
    }
}

impl EndOfCentralDirectoryHeader {
    pub fn as_slice(&self) -> [u8; EOCDR_LENGTH] {
        let mut array = [0; EOCDR_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.disk_num.to_le_bytes());
        array_push!(array, cursor, self.start_cent_dir_disk.to_le_bytes());
        array_push!(array, cursor, self.num_of_entries_disk.to_le_bytes());
        array_push!(array, cursor, self.num_of_entries.to_le_bytes());
        array_push!(array, cursor, self.size_cent_dir.to_le_bytes());
        array_push!(array, cursor, self.cent_dir_offset.to_le_bytes());
        array_push!(array, cursor, self.file_comm_length.to_le_bytes());

        array
    }
}

impl Zip64EndOfCentralDirectoryRecord {
    pub fn as_bytes(&self) -> [u8; ZIP64_EOCDR_LENGTH] {
        let mut array = [0; ZIP64_EOCDR_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.size_of_zip64_end_of_cd_record.to_le_bytes());
        array_push!(array, cursor, self.version_made_by.to_le_bytes());
        array_push!(array, cursor, self.version_needed_to_extract.to_le_bytes());
        array_push!(array, cursor, self.disk_number.to_le_bytes());
        array_push!(array, cursor, self.disk_number_start_of_cd.to_le_bytes());
        array_push!(array, cursor, self.num_entries_in_directory_on_disk.to_le_bytes());
        array_push!(array, cursor, self.num_entries_in_directory.to_le_bytes());
        array_push!(array, cursor, self.directory_size.to_le_bytes());
        array_push!(array, cursor, self.offset_of_start_of_directory.to_le_bytes());

        array
    }
}

impl Zip64EndOfCentralDirectoryLocator {
    pub fn as_bytes(&self) -> [u8; ZIP64_EOCDL_LENGTH] {
        let mut array = [0; ZIP64_EOCDL_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.number_of_disk_with_start_of_zip64_end_of_central_directory.to_le_bytes());
        array_push!(array, cursor, self.relative_offset.to_le_bytes());
        array_push!(array, cursor, self.total_number_of_disks.to_le_bytes());

        array
    }
}

impl From<[u8; LFH_LENGTH]> for LocalFileHeader {
    fn from(value: [u8; LFH_LENGTH]) -> LocalFileHeader {
        let mut fields = FieldReader::new(&value);

        LocalFileHeader {
            version: fields.u16(),
            flags: GeneralPurposeFlag::from(fields.u16()),
            compression: fields.u16(),
            mod_time: fields.u16(),
            mod_date: fields.u16(),
            crc: fields.u32(),
            compressed_size: fields.u32(),
            uncompressed_size: fields.u32(),
            file_name_length: fields.u16(),
            extra_field_length: fields.u16(),
        }
    }
}

impl From<[u8; CDH_LENGTH]> for CentralDirectoryRecord {
    fn from(value: [u8; CDH_LENGTH]) -> CentralDirectoryRecord {
        let mut fields = FieldReader::new(&value);

        CentralDirectoryRecord {
            v_made_by: fields.u16(),
            v_needed: fields.u16(),
            flags: GeneralPurposeFlag::from(fields.u16()),
            compression: fields.u16(),
            mod_time: fields.u16(),
            mod_date: fields.u16(),
            crc: fields.u32(),
            compressed_size: fields.u32(),
            uncompressed_size: fields.u32(),
            file_name_length: fields.u16(),
            extra_field_length: fields.u16(),
            file_comment_length: fields.u16(),
            disk_start: fields.u16(),
            inter_attr: fields.u16(),
            exter_attr: fields.u32(),
            lh_offset: fields.u32(),
        }
    }
}

impl From<[u8; EOCDR_LENGTH]> for EndOfCentralDirectoryHeader {
    fn from(value: [u8; EOCDR_LENGTH]) -> EndOfCentralDirectoryHeader {
        let mut fields = FieldReader::new(&value);

        EndOfCentralDirectoryHeader {
            disk_num: fields.u16(),
            start_cent_dir_disk: fields.u16(),
            num_of_entries_disk: fields.u16(),
            num_of_entries: fields.u16(),
            size_cent_dir: fields.u32(),
            cent_dir_offset: fields.u32(),
            file_comm_length: fields.u16(),
        }
    }
}

impl From<[u8; ZIP64_EOCDR_LENGTH]> for Zip64EndOfCentralDirectoryRecord {
    fn from(value: [u8; ZIP64_EOCDR_LENGTH]) -> Self {
        let mut fields = FieldReader::new(&value);

        Self {
            size_of_zip64_end_of_cd_record: fields.u64(),
            version_made_by: fields.u16(),
            version_needed_to_extract: fields.u16(),
            disk_number: fields.u32(),
            disk_number_start_of_cd: fields.u32(),
            num_entries_in_directory_on_disk: fields.u64(),
            num_entries_in_directory: fields.u64(),
            directory_size: fields.u64(),
            offset_of_start_of_directory: fields.u64(),
        }
    }
}

impl From<[u8; ZIP64_EOCDL_LENGTH]> for Zip64EndOfCentralDirectoryLocator {
    fn from(value: [u8; ZIP64_EOCDL_LENGTH]) -> Self {
        let mut fields = FieldReader::new(&value);

        Self {
            number_of_disk_with_start_of_zip64_end_of_central_directory: fields.u32(),
            relative_offset: fields.u64(),
            total_number_of_disks: fields.u32(),
        }
    }
}

impl CentralDirectoryRecord {
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<CentralDirectoryRecord> {
        let mut buffer: [u8; CDH_LENGTH] = [0; CDH_LENGTH];
        reader.read_exact(&mut buffer)?;
        Ok(CentralDirectoryRecord::from(buffer))
    }
}
