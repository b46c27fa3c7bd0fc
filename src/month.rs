//! BS month lengths and weekday offsets, derived by probing the bridge.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::bridge::{BridgeError, ConversionBridge};
use crate::consts::{BS_MAX_DAY, BS_MIN_MONTH_DAYS, PROBE_CEILING};
use crate::types::{Calendar, Month};
use crate::CalendarDate;

/// Length and first weekday of one BS month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MonthLayout {
    pub year:          u16,
    pub month:         Month,
    pub day_count:     u8,
    /// 0 = Sunday
    pub first_weekday: u8,
}

/// Error type for month probing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The bridge went away (or never arrived); retry later.
    #[error("conversion primitive is not available")]
    BridgeUnavailable,

    /// Day 1 of the month could not be converted.
    #[error(transparent)]
    Conversion(BridgeError),

    /// Day 1 converted but did not round-trip to the same month.
    #[error("BS {year}-{month:02}-01 does not round-trip through the conversion primitive")]
    Inconsistent { year: u16, month: u8 },

    /// Every probe up to the ceiling stayed in the month.
    #[error("BS {year}-{month:02} still valid at day {ceiling}; conversion primitive is inconsistent")]
    Exhausted { year: u16, month: u8, ceiling: u8 },
}

impl From<BridgeError> for ProbeError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Unavailable => Self::BridgeUnavailable,
            err @ BridgeError::Conversion { .. } => Self::Conversion(err),
        }
    }
}

/// Caching front for month probing.
///
/// Only successful layouts are cached, so a month that failed because the
/// bridge was unavailable is probed again on the next request.
#[derive(Debug)]
pub struct MonthModel {
    bridge: ConversionBridge,
    cache:  HashMap<(u16, Month), MonthLayout>,
}

impl MonthModel {
    pub fn new(bridge: ConversionBridge) -> Self {
        Self {
            bridge,
            cache: HashMap::new(),
        }
    }

    /// Layout of a BS month, probed on first use.
    ///
    /// # Errors
    /// Returns `ProbeError` when the month cannot be determined right now.
    pub fn month_layout(&mut self, year: u16, month: Month) -> Result<MonthLayout, ProbeError> {
        if let Some(layout) = self.cache.get(&(year, month)) {
            return Ok(*layout);
        }
        let layout = probe_month(&self.bridge, year, month)?;
        self.cache.insert((year, month), layout);
        Ok(layout)
    }

    pub fn cached(&self, year: u16, month: Month) -> Option<MonthLayout> {
        self.cache.get(&(year, month)).copied()
    }

    pub fn bridge(&self) -> &ConversionBridge {
        &self.bridge
    }
}

/// Probes day by day until the round trip leaves the month.
#[tracing::instrument(skip(bridge, month), fields(month = month.get()))]
pub(crate) fn probe_month(
    bridge: &ConversionBridge,
    year: u16,
    month: Month,
) -> Result<MonthLayout, ProbeError> {
    let m = month.get();
    let first = CalendarDate::bs(year, m, 1).map_err(|_| ProbeError::Inconsistent { year, month: m })?;
    let first_ad = bridge.bs_to_ad(&first)?;
    let first_weekday = first_ad
        .weekday_from_sunday()
        .ok_or(ProbeError::Inconsistent { year, month: m })?;

    let mut day_count = 0;
    for day in 1..=PROBE_CEILING {
        if !round_trips(bridge, year, m, day)? {
            break;
        }
        day_count = day;
    }

    if day_count == 0 {
        return Err(ProbeError::Inconsistent { year, month: m });
    }
    if day_count == PROBE_CEILING {
        return Err(ProbeError::Exhausted {
            year,
            month: m,
            ceiling: PROBE_CEILING,
        });
    }
    if !(BS_MIN_MONTH_DAYS..=BS_MAX_DAY).contains(&day_count) {
        warn!(day_count, "implausible month length reported by conversion primitive");
    }

    debug!(day_count, first_weekday, "probed month");
    Ok(MonthLayout {
        year,
        month,
        day_count,
        first_weekday,
    })
}

/// Whether `year-month-day` maps to AD and back into the same BS month.
///
/// Conversion failures end the month; only unavailability is an error.
fn round_trips(bridge: &ConversionBridge, year: u16, month: u8, day: u8) -> Result<bool, ProbeError> {
    let probe = format!("{year:04}-{month:02}-{day:02}");
    let ad = match bridge.bs_to_ad_raw(&probe) {
        Ok(ad) => ad,
        Err(BridgeError::Unavailable) => return Err(ProbeError::BridgeUnavailable),
        Err(BridgeError::Conversion { .. }) => return Ok(false),
    };
    let back = match bridge.ad_to_bs_raw(&ad) {
        Ok(back) => back,
        Err(BridgeError::Unavailable) => return Err(ProbeError::BridgeUnavailable),
        Err(BridgeError::Conversion { .. }) => return Ok(false),
    };
    Ok(CalendarDate::parse_iso(Calendar::Bs, &back)
        .is_ok_and(|bs| bs.year() == year && bs.month() == month))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bridge::ConversionPrimitive;
    use chrono::{Duration, NaiveDate};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Month lengths of BS 2081 and 2082
    const LENGTHS: [[u8; 12]; 2] = [
        [31, 31, 32, 32, 31, 30, 30, 30, 29, 30, 30, 30],
        [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
    ];

    /// 2081-01-01 BS
    fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 13).unwrap()
    }

    /// Table-backed primitive covering BS 2081..=2082.
    ///
    /// Like common converters it rolls out-of-range BS days into the next
    /// month rather than rejecting them.
    #[derive(Default)]
    pub(crate) struct TablePrimitive {
        pub calls: Rc<Cell<usize>>,
    }

    impl TablePrimitive {
        fn bs_to_days(year: u16, month: u8, day: u8) -> Option<i64> {
            let year_idx = usize::from(year.checked_sub(2081)?);
            if year_idx > 1 || !(1..=12).contains(&month) {
                return None;
            }
            let mut days: i64 = 0;
            for (y, lengths) in LENGTHS.iter().enumerate().take(year_idx + 1) {
                let months = if y == year_idx { usize::from(month - 1) } else { 12 };
                days += lengths[..months].iter().map(|&d| i64::from(d)).sum::<i64>();
            }
            Some(days + i64::from(day) - 1)
        }

        fn days_to_bs(mut days: i64) -> Option<(u16, u8, u8)> {
            if days < 0 {
                return None;
            }
            for (y, lengths) in LENGTHS.iter().enumerate() {
                for (m, &len) in lengths.iter().enumerate() {
                    if days < i64::from(len) {
                        return Some((2081 + y as u16, m as u8 + 1, days as u8 + 1));
                    }
                    days -= i64::from(len);
                }
            }
            None
        }
    }

    impl ConversionPrimitive for TablePrimitive {
        fn ad_to_bs(&self, iso_ad: &str) -> String {
            self.calls.set(self.calls.get() + 1);
            NaiveDate::parse_from_str(iso_ad, "%Y-%m-%d")
                .ok()
                .and_then(|d| Self::days_to_bs((d - epoch()).num_days()))
                .map_or_else(
                    || format!("Invalid AD date {iso_ad}"),
                    |(y, m, d)| format!("{y:04}-{m:02}-{d:02}"),
                )
        }

        fn bs_to_ad(&self, iso_bs: &str) -> String {
            self.calls.set(self.calls.get() + 1);
            let parts: Vec<u16> = iso_bs.split('-').filter_map(|p| p.parse().ok()).collect();
            if parts.len() != 3 || parts[2] == 0 || parts[2] > 40 {
                return format!("Invalid BS date {iso_bs}");
            }
            Self::bs_to_days(parts[0], parts[1] as u8, parts[2] as u8)
                .map_or_else(
                    || format!("Error: BS date {iso_bs} out of range"),
                    |days| (epoch() + Duration::days(days)).format("%Y-%m-%d").to_string(),
                )
        }
    }

    /// Converts every day to the same BS date, so probing never leaves the month
    struct Stuck;

    impl ConversionPrimitive for Stuck {
        fn ad_to_bs(&self, _: &str) -> String {
            "2082-01-01".to_owned()
        }

        fn bs_to_ad(&self, _: &str) -> String {
            "2025-04-14".to_owned()
        }
    }

    /// Only knows BS 2082-01, and gives it 28 days starting on 2025-04-14
    struct ShortMonth;

    impl ShortMonth {
        fn first() -> NaiveDate {
            NaiveDate::from_ymd_opt(2025, 4, 14).unwrap()
        }
    }

    impl ConversionPrimitive for ShortMonth {
        fn ad_to_bs(&self, iso_ad: &str) -> String {
            NaiveDate::parse_from_str(iso_ad, "%Y-%m-%d")
                .ok()
                .map(|d| (d - Self::first()).num_days())
                .filter(|days| (0..28).contains(days))
                .map_or_else(|| "Invalid".to_owned(), |days| format!("2082-01-{:02}", days + 1))
        }

        fn bs_to_ad(&self, iso_bs: &str) -> String {
            iso_bs
                .strip_prefix("2082-01-")
                .and_then(|d| d.parse::<i64>().ok())
                .filter(|d| (1..=28).contains(d))
                .map_or_else(
                    || "Invalid".to_owned(),
                    |d| (Self::first() + Duration::days(d - 1)).format("%Y-%m-%d").to_string(),
                )
        }
    }

    fn month(m: u8) -> Month {
        Month::new(m).unwrap()
    }

    #[test]
    fn test_table_primitive_round_trips() {
        let p = TablePrimitive::default();
        assert_eq!(p.bs_to_ad("2081-01-01"), "2024-04-13");
        assert_eq!(p.ad_to_bs("2024-04-13"), "2081-01-01");
        assert_eq!(p.ad_to_bs("2026-03-22"), "2082-12-08");
        assert_eq!(p.bs_to_ad("2082-12-08"), "2026-03-22");
    }

    #[test]
    fn test_layout_matches_table() {
        let mut model = MonthModel::new(ConversionBridge::new(TablePrimitive::default()));
        for (y, lengths) in [(2081, LENGTHS[0]), (2082, LENGTHS[1])] {
            for (i, &expected) in lengths.iter().enumerate() {
                let layout = model.month_layout(y, month(i as u8 + 1)).unwrap();
                assert_eq!(layout.day_count, expected, "{y}-{}", i + 1);
                assert!((29..=32).contains(&layout.day_count));
            }
        }
    }

    #[test]
    fn test_first_weekday() {
        let mut model = MonthModel::new(ConversionBridge::new(TablePrimitive::default()));
        // 2082-12-01 is 2026-03-15, a Sunday
        let layout = model.month_layout(2082, month(12)).unwrap();
        assert_eq!(layout.first_weekday, 0);
        // 2081-01-01 is 2024-04-13, a Saturday
        let layout = model.month_layout(2081, month(1)).unwrap();
        assert_eq!(layout.first_weekday, 6);
    }

    #[test]
    fn test_layouts_are_cached() {
        let primitive = TablePrimitive::default();
        let calls = Rc::clone(&primitive.calls);
        let mut model = MonthModel::new(ConversionBridge::new(primitive));

        let first = model.month_layout(2082, month(3)).unwrap();
        let after_probe = calls.get();
        assert!(after_probe > 0);

        let second = model.month_layout(2082, month(3)).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), after_probe);
        assert_eq!(model.cached(2082, month(3)), Some(first));
    }

    #[test]
    fn test_unavailable_is_not_cached() {
        let (bridge, installer) = ConversionBridge::pending();
        let mut model = MonthModel::new(bridge);

        assert_eq!(model.month_layout(2082, month(12)), Err(ProbeError::BridgeUnavailable));
        assert_eq!(model.cached(2082, month(12)), None);

        installer.install(TablePrimitive::default());
        let layout = model.month_layout(2082, month(12)).unwrap();
        assert_eq!(layout.day_count, 30);
    }

    #[test]
    fn test_out_of_table_month_is_conversion_failure() {
        let mut model = MonthModel::new(ConversionBridge::new(TablePrimitive::default()));
        let result = model.month_layout(2090, month(1));
        assert!(matches!(result, Err(ProbeError::Conversion(_))));
    }

    #[test]
    fn test_short_month_is_returned_as_probed() {
        let mut model = MonthModel::new(ConversionBridge::new(ShortMonth));
        assert_eq!(
            model.month_layout(2082, month(1)),
            Ok(MonthLayout {
                year:          2082,
                month:         month(1),
                day_count:     28,
                // 2025-04-14 is a Monday
                first_weekday: 1,
            })
        );
        assert_eq!(model.cached(2082, month(1)).map(|l| l.day_count), Some(28));
    }

    #[test]
    fn test_probe_ceiling() {
        let mut model = MonthModel::new(ConversionBridge::new(Stuck));
        let result = model.month_layout(2082, month(1));
        assert_eq!(
            result,
            Err(ProbeError::Exhausted {
                year:    2082,
                month:   1,
                ceiling: PROBE_CEILING,
            })
        );
    }

    #[test]
    fn test_day_one_mismatch_is_inconsistent() {
        // Stuck always answers 2082-01, so any other month fails at day 1
        let mut model = MonthModel::new(ConversionBridge::new(Stuck));
        assert_eq!(
            model.month_layout(2082, month(5)),
            Err(ProbeError::Inconsistent { year: 2082, month: 5 })
        );
    }
}
