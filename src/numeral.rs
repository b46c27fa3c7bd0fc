//! Digit transliteration between Latin and Devanagari numerals.

use crate::language::DisplayLanguage;

/// Devanagari digits, indexed by their value
const DEVANAGARI_DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

/// Renders ASCII digits in the numeral script of `lang`.
///
/// Every other character passes through unchanged.
pub fn to_local_digits(s: &str, lang: DisplayLanguage) -> String {
    match lang {
        DisplayLanguage::En => s.to_owned(),
        DisplayLanguage::Ne => s
            .chars()
            .map(|c| c.to_digit(10).map_or(c, |d| DEVANAGARI_DIGITS[d as usize]))
            .collect(),
    }
}

/// Maps Devanagari digits back to ASCII, leaving everything else untouched.
pub fn to_ascii_digits(s: &str) -> String {
    s.chars()
        .map(|c| {
            DEVANAGARI_DIGITS
                .iter()
                .position(|&d| d == c)
                .and_then(|i| char::from_digit(i as u32, 10))
                .unwrap_or(c)
        })
        .collect()
}
