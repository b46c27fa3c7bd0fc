use std::time::Duration;

use serde::Deserialize;

use crate::consts::{FALLBACK_MONTH, FALLBACK_YEAR, MAX_RETRIES, MIN_TIMER_DELAY_MS, RETRY_DELAY_MS};
use crate::language::DisplayLanguage;
use crate::locale::{LocaleFormat, resolve};
use crate::navigator::CalendarNavigator;
use crate::types::Month;

/// Picker settings, passed explicitly to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PickerConfig {
    /// Language for BS display text and the grid.
    #[serde(default)]
    pub language: DisplayLanguage,

    /// Host locale code, e.g. `en-GB`.
    #[serde(default)]
    pub locale: Option<String>,

    /// Host region code, e.g. `NP`.
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Forward-sync retries per binding while the bridge is unavailable.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// When set, bound fields are diffed on this interval instead of relying
    /// on change notifications.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    #[serde(default = "default_fallback_year")]
    pub fallback_year: u16,

    #[serde(default = "default_fallback_month")]
    pub fallback_month: Month,
}

fn default_retry_delay_ms() -> u64 {
    RETRY_DELAY_MS
}
fn default_max_retries() -> u32 {
    MAX_RETRIES
}
fn default_fallback_year() -> u16 {
    FALLBACK_YEAR
}
fn default_fallback_month() -> Month {
    Month::new(FALLBACK_MONTH).unwrap_or(Month::FIRST)
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            language:         DisplayLanguage::default(),
            locale:           None,
            region:           None,
            retry_delay_ms:   default_retry_delay_ms(),
            max_retries:      default_max_retries(),
            poll_interval_ms: None,
            fallback_year:    default_fallback_year(),
            fallback_month:   default_fallback_month(),
        }
    }
}

impl PickerConfig {
    /// Convention for writing AD values when a field's own is unknown.
    pub fn resolved_format(&self) -> LocaleFormat {
        resolve(self.locale.as_deref(), self.region.as_deref())
    }

    /// Retry and re-render delay, never zero.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.max(MIN_TIMER_DELAY_MS))
    }

    /// Polling interval, never zero.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms
            .map(|ms| Duration::from_millis(ms.max(MIN_TIMER_DELAY_MS)))
    }

    pub const fn fallback_cursor(&self) -> CalendarNavigator {
        CalendarNavigator::new(self.fallback_year, self.fallback_month)
    }
}
