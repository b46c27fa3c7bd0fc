//! Presentation tables for the picker's display language.

use crate::prelude::*;
use crate::types::Month;
use serde::{Deserialize, Serialize};

const MONTHS_EN: [&str; 12] = [
    "Baisakh", "Jestha", "Asar", "Shrawan", "Bhadra", "Asoj", "Kartik", "Mangsir", "Poush", "Magh",
    "Falgun", "Chaitra",
];

const MONTHS_NE: [&str; 12] = [
    "बैशाख", "जेठ", "असार", "साउन", "भदौ", "असोज", "कार्तिक", "मंसिर", "पुष", "माघ", "फागुन", "चैत",
];

/// Sunday first
const WEEKDAYS_EN: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const WEEKDAYS_NE: [&str; 7] = ["आइत", "सोम", "मंगल", "बुध", "बिहि", "शुक्र", "शनि"];

/// Language used to render BS dates, grid labels and numerals.
///
/// Only presentation depends on it; date values are unaffected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLanguage {
    #[display(fmt = "ne")]
    Ne,
    #[default]
    #[display(fmt = "en")]
    En,
}

impl DisplayLanguage {
    /// The other language.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ne => Self::En,
            Self::En => Self::Ne,
        }
    }

    /// Label prefixed to rendered BS dates.
    pub const fn era_label(self) -> &'static str {
        match self {
            Self::Ne => "बि.सं.",
            Self::En => "BS",
        }
    }

    /// Name of a BS month.
    pub const fn month_name(self, month: Month) -> &'static str {
        match self {
            Self::Ne => MONTHS_NE[month.index()],
            Self::En => MONTHS_EN[month.index()],
        }
    }

    /// Seven weekday column labels, Sunday first.
    pub const fn weekday_labels(self) -> [&'static str; 7] {
        match self {
            Self::Ne => WEEKDAYS_NE,
            Self::En => WEEKDAYS_EN,
        }
    }
}
