//! Field-order convention of locale-formatted AD dates.

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Token order of slash-separated AD dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocaleFormat {
    /// `DD/MM/YYYY`
    #[display(fmt = "DMY")]
    Dmy,
    /// `MM/DD/YYYY`
    #[default]
    #[display(fmt = "MDY")]
    Mdy,
}

/// English locales that write the day first
const DMY_LOCALES: &[&str] = &["en-gb", "en-au", "en-nz", "en-ie", "en-za"];

/// Languages whose every regional variant writes the day first
const DMY_LANGUAGES: &[&str] = &["hi", "ne"];

const MDY_LOCALES: &[&str] = &["en-us", "en-ca"];

const DMY_REGIONS: &[&str] = &["GB", "AU", "NZ", "IE", "ZA", "IN", "NP"];

const MDY_REGIONS: &[&str] = &["US", "CA"];

/// Resolves the date convention from the host's locale and region signals.
///
/// The locale code wins over the region code; anything unrecognized falls
/// back to `Mdy`.
pub fn resolve(locale: Option<&str>, region: Option<&str>) -> LocaleFormat {
    if let Some(format) = locale.and_then(format_for_locale) {
        return format;
    }
    region.and_then(format_for_region).unwrap_or_default()
}

fn format_for_locale(locale: &str) -> Option<LocaleFormat> {
    let normalized = locale.trim().replace('_', "-").to_ascii_lowercase();
    let language = normalized.split('-').next().unwrap_or_default();

    let is_dmy = DMY_LOCALES
        .iter()
        .any(|l| normalized == *l || normalized.starts_with(&format!("{l}-")))
        || DMY_LANGUAGES.contains(&language);
    if is_dmy {
        return Some(LocaleFormat::Dmy);
    }
    MDY_LOCALES
        .contains(&normalized.as_str())
        .then_some(LocaleFormat::Mdy)
}

fn format_for_region(region: &str) -> Option<LocaleFormat> {
    let normalized = region.trim().to_ascii_uppercase();
    if DMY_REGIONS.contains(&normalized.as_str()) {
        Some(LocaleFormat::Dmy)
    } else if MDY_REGIONS.contains(&normalized.as_str()) {
        Some(LocaleFormat::Mdy)
    } else {
        None
    }
}
