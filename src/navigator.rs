//! Month-by-month cursor of an open picker.

use tracing::debug;

use crate::bridge::ConversionBridge;
use crate::consts::{DECEMBER, JANUARY, MAX_YEAR};
use crate::types::{Calendar, Month};
use crate::CalendarDate;

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Previous,
    Next,
}

/// BS year and month the picker is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarNavigator {
    year:  u16,
    month: Month,
}

impl CalendarNavigator {
    pub const fn new(year: u16, month: Month) -> Self {
        Self { year, month }
    }

    /// Starting cursor for a new session.
    ///
    /// Prefers the BS date currently displayed for the field, then today's
    /// date converted through the bridge, then `fallback`.
    pub fn initial(displayed: Option<&CalendarDate>, bridge: &ConversionBridge, fallback: Self) -> Self {
        if let Some(bs) = displayed.filter(|d| d.calendar() == Calendar::Bs) {
            return Self::new(bs.year(), bs.month_typed());
        }

        let today = CalendarDate::today_utc().ok().and_then(|ad| bridge.ad_to_bs(&ad).ok());
        match today {
            Some(bs) => Self::new(bs.year(), bs.month_typed()),
            None => {
                debug!(year = fallback.year, month = fallback.month.get(), "using fallback cursor");
                fallback
            }
        }
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn month(&self) -> Month {
        self.month
    }

    /// Moves one month, rolling the year over at Chaitra/Baisakh.
    ///
    /// The cursor stays put at the first and last supported months.
    pub fn step_month(&mut self, step: Step) {
        let (year, month) = match (step, self.month.get()) {
            (Step::Next, DECEMBER) if self.year < MAX_YEAR => (self.year + 1, JANUARY),
            (Step::Previous, JANUARY) if self.year > 1 => (self.year - 1, DECEMBER),
            (Step::Next, DECEMBER) | (Step::Previous, JANUARY) => return,
            (Step::Next, m) => (self.year, m + 1),
            (Step::Previous, m) => (self.year, m - 1),
        };
        if let Ok(month) = Month::new(month) {
            self.year = year;
            self.month = month;
        }
    }

    /// Moves one year, keeping the month.
    pub fn step_year(&mut self, step: Step) {
        self.year = match step {
            Step::Next if self.year < MAX_YEAR => self.year + 1,
            Step::Previous if self.year > 1 => self.year - 1,
            Step::Next | Step::Previous => self.year,
        };
    }
}
