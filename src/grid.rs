//! Logical month grid for the picker.

use serde::Serialize;

use crate::consts::DAYS_PER_WEEK;
use crate::language::DisplayLanguage;
use crate::month::MonthLayout;
use crate::numeral::to_local_digits;

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridCell {
    /// Padding before day 1 or after the last day
    Blank,
    Day {
        day:      u8,
        /// Day number in the display language's numerals
        label:    String,
        selected: bool,
    },
}

impl GridCell {
    pub const fn day(&self) -> Option<u8> {
        match self {
            Self::Day { day, .. } => Some(*day),
            Self::Blank => None,
        }
    }

    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::Day { selected: true, .. })
    }
}

/// Rows of exactly seven cells plus the month's header labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridModel {
    /// Month name and year, e.g. `Chaitra 2082`
    pub title:          String,
    pub weekday_labels: [&'static str; DAYS_PER_WEEK],
    pub rows:           Vec<Vec<GridCell>>,
}

impl GridModel {
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.rows.iter().flatten()
    }

    /// The selected day, if any cell is marked.
    pub fn selected(&self) -> Option<u8> {
        self.cells().find(|c| c.is_selected()).and_then(GridCell::day)
    }
}

/// Lays out one BS month as a Sunday-first grid.
///
/// `selected_day` is marked only when it falls inside the month.
pub fn build_grid(layout: &MonthLayout, selected_day: Option<u8>, lang: DisplayLanguage) -> GridModel {
    let leading = usize::from(layout.first_weekday) % DAYS_PER_WEEK;
    let mut cells: Vec<GridCell> = Vec::with_capacity(leading + usize::from(layout.day_count) + DAYS_PER_WEEK);
    cells.extend(std::iter::repeat_n(GridCell::Blank, leading));
    cells.extend((1..=layout.day_count).map(|day| GridCell::Day {
        day,
        label: to_local_digits(&day.to_string(), lang),
        selected: selected_day == Some(day),
    }));
    let trailing = (DAYS_PER_WEEK - cells.len() % DAYS_PER_WEEK) % DAYS_PER_WEEK;
    cells.extend(std::iter::repeat_n(GridCell::Blank, trailing));

    let title = format!(
        "{} {}",
        lang.month_name(layout.month),
        to_local_digits(&layout.year.to_string(), lang)
    );

    GridModel {
        title,
        weekday_labels: lang.weekday_labels(),
        rows: cells.chunks(DAYS_PER_WEEK).map(<[GridCell]>::to_vec).collect(),
    }
}
