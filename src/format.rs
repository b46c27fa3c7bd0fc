//! Parsing and formatting of AD field values.

use crate::consts::{DATE_SEPARATOR, LOCALE_SEPARATOR, MAX_MONTH, MIN_INPUT_LEN};
use crate::locale::LocaleFormat;
use crate::numeral::to_ascii_digits;
use crate::prelude::*;
use crate::{CalendarDate, ParseError};
use chrono::{Duration, NaiveDate};

/// How an AD date is written into a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DateStyle {
    /// Slash-separated, ordered by locale convention
    #[display(fmt = "{_0}")]
    Locale(LocaleFormat),
    /// `YYYY-MM-DD`
    #[display(fmt = "ISO")]
    Iso,
}

impl From<LocaleFormat> for DateStyle {
    fn from(format: LocaleFormat) -> Self {
        Self::Locale(format)
    }
}

/// Parses a free-text AD date, returning `None` when it is unusable.
///
/// See [`try_parse`] for the rules.
pub fn parse(raw: &str, fmt: LocaleFormat) -> Option<CalendarDate> {
    try_parse(raw, fmt).ok()
}

/// Parses a free-text AD date in either digit script.
///
/// Hyphenated `YYYY-MM-DD` text is accepted regardless of `fmt`; otherwise the
/// value must be three slash-separated integers ordered by `fmt`. Overflowing
/// days and months roll forward the way UTC calendar construction does, so
/// `02/30/2026` becomes 2026-03-02.
///
/// # Errors
/// Returns `ParseError` when the text is too short, malformed, or normalizes
/// to a year outside the supported range.
pub fn try_parse(raw: &str, fmt: LocaleFormat) -> Result<CalendarDate, ParseError> {
    let ascii = to_ascii_digits(raw);
    let trimmed = ascii.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if trimmed.chars().count() < MIN_INPUT_LEN {
        return Err(ParseError::TooShort(trimmed.to_owned()));
    }

    let (year, month, day) = if is_iso_shape(trimmed) {
        let parts: Vec<&str> = trimmed.split(DATE_SEPARATOR).collect();
        (
            parse_token(parts[0])?,
            parse_token(parts[1])?,
            parse_token(parts[2])?,
        )
    } else {
        let parts: Vec<&str> = trimmed.split(LOCALE_SEPARATOR).map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseError::InvalidFormat(format!(
                "expected 3 '{LOCALE_SEPARATOR}'-separated fields, found {}: {trimmed}",
                parts.len()
            )));
        }
        let first = parse_token(parts[0])?;
        let second = parse_token(parts[1])?;
        let year = parse_token(parts[2])?;
        match fmt {
            LocaleFormat::Dmy => (year, second, first),
            LocaleFormat::Mdy => (year, first, second),
        }
    };

    let normalized = normalize_utc(year, month, day)
        .ok_or_else(|| ParseError::InvalidFormat(trimmed.to_owned()))?;
    CalendarDate::from_naive(normalized)
}

/// Formats an AD date in `style`, zero-padding month and day.
pub fn format(date: &CalendarDate, style: DateStyle) -> String {
    let (y, m, d) = (date.year(), date.month(), date.day());
    match style {
        DateStyle::Iso => format!("{y:04}{DATE_SEPARATOR}{m:02}{DATE_SEPARATOR}{d:02}"),
        DateStyle::Locale(LocaleFormat::Mdy) => {
            format!("{m:02}{LOCALE_SEPARATOR}{d:02}{LOCALE_SEPARATOR}{y:04}")
        }
        DateStyle::Locale(LocaleFormat::Dmy) => {
            format!("{d:02}{LOCALE_SEPARATOR}{m:02}{LOCALE_SEPARATOR}{y:04}")
        }
    }
}

/// Infers the convention a field value was written in.
///
/// Returns `None` when the value is empty, malformed, or ambiguous (both
/// leading fields could be a month).
pub fn detect_style(raw: &str) -> Option<DateStyle> {
    let ascii = to_ascii_digits(raw);
    let trimmed = ascii.trim();
    if is_iso_shape(trimmed) {
        return Some(DateStyle::Iso);
    }

    let parts: Vec<u32> = trimmed
        .split(LOCALE_SEPARATOR)
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<_>>()?;
    if parts.len() != 3 {
        return None;
    }

    let max_month = u32::from(MAX_MONTH);
    match (parts[0] > max_month, parts[1] > max_month) {
        (true, false) => Some(DateStyle::Locale(LocaleFormat::Dmy)),
        (false, true) => Some(DateStyle::Locale(LocaleFormat::Mdy)),
        _ => None,
    }
}

/// `YYYY-MM-DD` with exactly 4-2-2 ASCII digits
pub(crate) fn is_iso_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == DATE_SEPARATOR as u8,
            _ => b.is_ascii_digit(),
        })
}

fn parse_token(s: &str) -> Result<i32, ParseError> {
    s.parse::<i32>()
        .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
}

/// Builds a date the way a UTC calendar constructor does: months past 12
/// carry into the year, days past the month end carry into later months, and
/// day 0 is the last day of the previous month. Years 0..=99 map to 1900..=1999.
fn normalize_utc(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let year = if (0..=99).contains(&year) { year + 1900 } else { year };
    let months_from_january = month.checked_sub(1)?;
    let year = year.checked_add(months_from_january.div_euclid(12))?;
    let month = u32::try_from(months_from_january.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::days(i64::from(day) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(y: u16, m: u8, d: u8) -> CalendarDate {
        CalendarDate::ad(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_mdy_and_dmy() {
        assert_eq!(parse("03/22/2026", LocaleFormat::Mdy), Some(ad(2026, 3, 22)));
        assert_eq!(parse("22/03/2026", LocaleFormat::Dmy), Some(ad(2026, 3, 22)));
        // same text, different convention
        assert_eq!(parse("03/04/2026", LocaleFormat::Mdy), Some(ad(2026, 3, 4)));
        assert_eq!(parse("03/04/2026", LocaleFormat::Dmy), Some(ad(2026, 4, 3)));
    }

    #[test]
    fn test_parse_iso_ignores_locale() {
        for fmt in [LocaleFormat::Mdy, LocaleFormat::Dmy] {
            assert_eq!(parse("2026-03-22", fmt), Some(ad(2026, 3, 22)));
        }
    }

    #[test]
    fn test_parse_devanagari_digits() {
        assert_eq!(parse("०३/२२/२०२६", LocaleFormat::Mdy), Some(ad(2026, 3, 22)));
        assert_eq!(parse("२०२६-०३-२२", LocaleFormat::Dmy), Some(ad(2026, 3, 22)));
    }

    #[test]
    fn test_parse_unpadded() {
        assert_eq!(parse("3/2/2026", LocaleFormat::Mdy), Some(ad(2026, 3, 2)));
    }

    #[test]
    fn test_parse_rejections() {
        struct TestCase {
            input:       &'static str,
            description: &'static str,
        }

        let cases = [
            TestCase {
                input:       "",
                description: "empty",
            },
            TestCase {
                input:       "3/2/26",
                description: "shorter than 8 characters",
            },
            TestCase {
                input:       "03/22/2026/1",
                description: "four fields",
            },
            TestCase {
                input:       "03-22-2026",
                description: "hyphens without ISO shape",
            },
            TestCase {
                input:       "03/xx/2026",
                description: "non-numeric day",
            },
            TestCase {
                input:       "March 22, 2026",
                description: "free text",
            },
        ];

        for case in &cases {
            assert_eq!(
                parse(case.input, LocaleFormat::Mdy),
                None,
                "{} ({:?}) should be rejected",
                case.description,
                case.input
            );
        }
    }

    #[test]
    fn test_try_parse_error_kinds() {
        assert!(matches!(try_parse("  ", LocaleFormat::Mdy), Err(ParseError::EmptyInput)));
        assert!(matches!(try_parse("1/1/26", LocaleFormat::Mdy), Err(ParseError::TooShort(_))));
        assert!(matches!(
            try_parse("aa/bb/cccc", LocaleFormat::Mdy),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_overflow_rolls_forward() {
        struct TestCase {
            input:    &'static str,
            expected: (u16, u8, u8),
        }

        let cases = [
            TestCase {
                input:    "04/31/2026",
                expected: (2026, 5, 1),
            },
            TestCase {
                input:    "02/29/2025",
                expected: (2025, 3, 1),
            },
            TestCase {
                input:    "02/29/2024",
                expected: (2024, 2, 29),
            },
            TestCase {
                input:    "13/01/2026",
                expected: (2027, 1, 1),
            },
            TestCase {
                input:    "03/00/2026",
                expected: (2026, 2, 28),
            },
            TestCase {
                input:    "00/15/2026",
                expected: (2025, 12, 15),
            },
            TestCase {
                input:    "12/45/2026",
                expected: (2027, 1, 14),
            },
        ];

        for case in &cases {
            let (y, m, d) = case.expected;
            assert_eq!(
                parse(case.input, LocaleFormat::Mdy),
                Some(ad(y, m, d)),
                "{}",
                case.input
            );
        }
    }

    #[test]
    fn test_two_digit_years_map_to_twentieth_century() {
        assert_eq!(parse("01/02/0099", LocaleFormat::Mdy), Some(ad(1999, 1, 2)));
    }

    #[test]
    fn test_format_styles() {
        let d = ad(2026, 3, 2);
        assert_eq!(format(&d, DateStyle::Locale(LocaleFormat::Mdy)), "03/02/2026");
        assert_eq!(format(&d, DateStyle::Locale(LocaleFormat::Dmy)), "02/03/2026");
        assert_eq!(format(&d, DateStyle::Iso), "2026-03-02");
    }

    #[test]
    fn test_format_parse_round_trip() {
        let dates = [ad(2026, 3, 22), ad(2024, 2, 29), ad(1999, 12, 31), ad(2026, 1, 1)];
        for d in dates {
            for fmt in [LocaleFormat::Mdy, LocaleFormat::Dmy] {
                let s = format(&d, fmt.into());
                assert_eq!(parse(&s, fmt), Some(d), "{s}");
                assert_eq!(format(&parse(&s, fmt).unwrap(), fmt.into()), s);
            }
            let iso = format(&d, DateStyle::Iso);
            assert_eq!(parse(&iso, LocaleFormat::Dmy), Some(d));
        }
    }

    #[test]
    fn test_detect_style() {
        assert_eq!(detect_style("2026-03-22"), Some(DateStyle::Iso));
        assert_eq!(detect_style("22/03/2026"), Some(DateStyle::Locale(LocaleFormat::Dmy)));
        assert_eq!(detect_style("03/22/2026"), Some(DateStyle::Locale(LocaleFormat::Mdy)));
        assert_eq!(detect_style("०३/२२/२०२६"), Some(DateStyle::Locale(LocaleFormat::Mdy)));
        assert_eq!(detect_style("03/04/2026"), None);
        assert_eq!(detect_style(""), None);
        assert_eq!(detect_style("garbage"), None);
    }

    #[test]
    fn test_date_style_display() {
        assert_eq!(DateStyle::Iso.to_string(), "ISO");
        assert_eq!(DateStyle::from(LocaleFormat::Dmy).to_string(), "DMY");
    }
}
