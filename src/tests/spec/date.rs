// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#[cfg(feature = "chrono")]
use chrono::{TimeZone, Utc};

use crate::read::ZipArchive;
use crate::write::ZipFileWriter;
use crate::{Compression, ZipDateTime, ZipDateTimeBuilder, ZipEntryBuilder};

#[test]
#[cfg(feature = "chrono")]
fn date_conversion_test_chrono() {
    let original_dt = Utc.timestamp_opt(1666544102, 0).unwrap();
    let zip_dt = ZipDateTime::from_chrono(&original_dt);
    let result_dt = zip_dt.as_chrono().single().expect("expected single unique result");
    assert_eq!(result_dt, original_dt);
}

fn built() -> ZipDateTime {
    ZipDateTimeBuilder::new().year(2000).month(9).day(8).hour(7).minute(5).second(4).build()
}

#[test]
fn date_conversion_test() {
    let built = built();

    assert_eq!(2000, built.year());
    assert_eq!(9, built.month());
    assert_eq!(8, built.day());
    assert_eq!(7, built.hour());
    assert_eq!(5, built.minute());
    assert_eq!(4, built.second());
    assert_eq!(built, ZipDateTime::from_raw(built.raw_date(), built.raw_time()));
}

#[test]
fn date_survives_archive() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let builder = ZipEntryBuilder::new("dated".into(), Compression::Stored).last_modification_date(built());
    writer.write_entry_whole(builder, b"").unwrap();

    let archive = ZipArchive::open(writer.close().unwrap()).unwrap();
    assert_eq!(*archive.entry("dated").unwrap().last_modification_date(), built());
}
