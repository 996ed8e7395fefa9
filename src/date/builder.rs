// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::ZipDateTime;

/// A builder for [`ZipDateTime`].
pub struct ZipDateTimeBuilder(pub(crate) ZipDateTime);

impl From<ZipDateTime> for ZipDateTimeBuilder {
    fn from(date: ZipDateTime) -> Self {
        Self(date)
    }
}

impl Default for ZipDateTimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipDateTimeBuilder {
    /// Constructs a new builder which defines the raw underlying data of a ZIP entry.
    pub fn new() -> Self {
        Self(ZipDateTime { date: 0, time: 0 })
    }

    /// Sets the date and time's year.
    ///
    /// Years outside of the representable range (1980 to 2107) are clamped.
    pub fn year(mut self, year: i32) -> Self {
        let year = (year.clamp(1980, 2107) - 1980) as u16;
        self.0.date = (self.0.date & !0xFE00) | ((year << 9) & 0xFE00);
        self
    }

    /// Sets the date and time's month.
    pub fn month(mut self, month: u32) -> Self {
        self.0.date = (self.0.date & !0x1E0) | (((month as u16) << 5) & 0x1E0);
        self
    }

    /// Sets the date and time's day.
    pub fn day(mut self, day: u32) -> Self {
        self.0.date = (self.0.date & !0x1F) | ((day as u16) & 0x1F);
        self
    }

    /// Sets the date and time's hour.
    pub fn hour(mut self, hour: u32) -> Self {
        self.0.time = (self.0.time & !0xF800) | (((hour as u16) << 11) & 0xF800);
        self
    }

    /// Sets the date and time's minute.
    pub fn minute(mut self, minute: u32) -> Self {
        self.0.time = (self.0.time & !0x7E0) | (((minute as u16) << 5) & 0x7E0);
        self
    }

    /// Sets the date and time's second.
    ///
    /// Note that MS-DOS has a maximum granularity of two seconds.
    pub fn second(mut self, second: u32) -> Self {
        self.0.time = (self.0.time & !0x1F) | (((second >> 1) as u16) & 0x1F);
        self
    }

    /// Consumes this builder and returns a final [`ZipDateTime`].
    ///
    /// This is equivalent to:
    /// ```
    /// # use mountzip::{ZipDateTime, ZipDateTimeBuilder};
    /// #
    /// # let builder = ZipDateTimeBuilder::new().year(2024).month(3).day(2);
    /// let date: ZipDateTime = builder.into();
    /// ```
    pub fn build(self) -> ZipDateTime {
        self.into()
    }
}
