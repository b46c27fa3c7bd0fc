//! Bikram Sambat date picker engine.
//!
//! Bridges Gregorian ("AD") field values and the Bikram Sambat ("BS")
//! calendar through an externally supplied day-level conversion primitive,
//! derives BS month layouts by probing that primitive, and keeps a text
//! field and a navigable month grid in sync.

mod bridge;
mod config;
mod consts;
mod field;
mod format;
mod grid;
mod language;
mod locale;
mod month;
mod navigator;
mod numeral;
mod prelude;
mod session;
mod sync;
mod timer;
mod types;

pub use bridge::{BridgeError, BridgeInstaller, ConversionBridge, ConversionPrimitive};
pub use config::PickerConfig;
pub use consts::*;
pub use field::{
    DateField, DefaultSink, ExternalWidget, PollingSource, PushSource, ValueChangeSource,
    ValueSink,
};
pub use format::{DateStyle, detect_style, format, parse, try_parse};
pub use grid::{GridCell, GridModel, build_grid};
pub use language::DisplayLanguage;
pub use locale::{LocaleFormat, resolve};
pub use month::{MonthLayout, MonthModel, ProbeError};
pub use navigator::{CalendarNavigator, Step};
pub use numeral::{to_ascii_digits, to_local_digits};
pub use session::{Anchor, CalendarSession, PickerView};
pub use sync::{DisplayState, FieldId, SyncController, SyncError};
pub use timer::{TimerId, TimerQueue};
pub use types::{Calendar, Day, Month, Year};

use crate::prelude::*;
use chrono::{Datelike, NaiveDate, Utc};
use std::str::FromStr;

/// A validated day in either calendar.
///
/// The day is checked against the Gregorian month length for `Ad` dates and
/// against the 32-day ceiling for `Bs` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{:04}-{:02}-{:02}", "year.get()", "month.get()", "day.get()")]
pub struct CalendarDate {
    year:     Year,
    month:    Month,
    day:      Day,
    calendar: Calendar,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid {calendar} day {day} for month {year}-{month:02}")]
    InvalidDay {
        calendar: Calendar,
        year:     u16,
        month:    u8,
        day:      u8,
    },
    #[display(fmt = "Empty date string")]
    EmptyInput,
    #[display(fmt = "Date string too short: {_0:?}")]
    TooShort(String),
}

impl std::error::Error for ParseError {}

impl CalendarDate {
    /// Creates a date, validating every component against `calendar`.
    ///
    /// # Errors
    /// Returns the `ParseError` of the first component out of range.
    pub fn new(calendar: Calendar, year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        Ok(Self {
            year: Year::new(year)?,
            month: Month::new(month)?,
            day: Day::new(day, calendar, year, month)?,
            calendar,
        })
    }

    /// Creates a Gregorian date.
    ///
    /// # Errors
    /// Returns `ParseError` if the components do not name a real Gregorian day.
    pub fn ad(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        Self::new(Calendar::Ad, year, month, day)
    }

    /// Creates a Bikram Sambat date.
    ///
    /// # Errors
    /// Returns `ParseError` if a component is outside the BS bounds.
    pub fn bs(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        Self::new(Calendar::Bs, year, month, day)
    }

    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    pub const fn month_typed(&self) -> Month {
        self.month
    }

    pub const fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Parses a hyphenated `YYYY-MM-DD` string in the given calendar.
    ///
    /// Components need not be zero-padded; surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns `ParseError` for empty input, a wrong number of components,
    /// non-numeric components or out-of-range values.
    pub fn parse_iso(calendar: Calendar, s: &str) -> Result<Self, ParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let parts: Vec<&str> = trimmed.split(DATE_SEPARATOR).map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseError::InvalidFormat(trimmed.to_owned()));
        }

        let year = parse_component::<u16>(parts[0])?;
        let month = parse_component::<u8>(parts[1])?;
        let day = parse_component::<u8>(parts[2])?;
        Self::new(calendar, year, month, day)
    }

    /// Gregorian view of this date, `None` for BS dates.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        match self.calendar {
            Calendar::Ad => NaiveDate::from_ymd_opt(
                i32::from(self.year()),
                u32::from(self.month()),
                u32::from(self.day()),
            ),
            Calendar::Bs => None,
        }
    }

    /// Builds an AD date from a chrono date.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` if the year is outside `1..=MAX_YEAR`,
    /// including negative and other years that do not fit a `u16`.
    pub fn from_naive(date: NaiveDate) -> Result<Self, ParseError> {
        let year = u16::try_from(date.year()).map_err(|_| {
            ParseError::InvalidYear(if date.year() < 0 { 0 } else { u16::MAX })
        })?;
        // chrono months and days always fit in u8
        let month = u8::try_from(date.month()).map_err(|_| ParseError::InvalidFormat(date.to_string()))?;
        let day = u8::try_from(date.day()).map_err(|_| ParseError::InvalidFormat(date.to_string()))?;
        Self::ad(year, month, day)
    }

    /// Day of week with 0 = Sunday, `None` for BS dates.
    pub fn weekday_from_sunday(&self) -> Option<u8> {
        self.to_naive()
            .and_then(|d| u8::try_from(d.weekday().num_days_from_sunday()).ok())
    }

    /// Today's date in UTC.
    ///
    /// # Errors
    /// Returns `ParseError` only if the system clock is outside `1..=MAX_YEAR`.
    pub fn today_utc() -> Result<Self, ParseError> {
        Self::from_naive(Utc::now().date_naive())
    }

    /// Returns the same date with its day replaced, validated for this calendar.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if `day` is outside this month.
    pub fn with_day(&self, day: u8) -> Result<Self, ParseError> {
        Self::new(self.calendar, self.year(), self.month(), day)
    }
}

/// Strict numeric parse of one date component
fn parse_component<T: FromStr>(s: &str) -> Result<T, ParseError> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::InvalidFormat(s.to_owned()));
    }
    s.parse::<T>()
        .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
}
