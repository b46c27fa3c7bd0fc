/// Maximum valid year (inclusive), shared by both calendars
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December / Chaitra)
pub const MAX_MONTH: u8 = 12;

/// Month number for January / Baisakh
pub const JANUARY: u8 = 1;
/// Month number for February
pub const FEBRUARY: u8 = 2;
/// Month number for December / Chaitra
pub const DECEMBER: u8 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each Gregorian month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Longest month a Bikram Sambat year can contain
pub const BS_MAX_DAY: u8 = 32;

/// Plausible range of Bikram Sambat month lengths
pub const BS_MIN_MONTH_DAYS: u8 = 29;

/// Hard ceiling for month-length probing
pub const PROBE_CEILING: u8 = 35;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: u16 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';
/// Separator used by locale-ordered field values (`MM/DD/YYYY`, `DD/MM/YYYY`)
pub const LOCALE_SEPARATOR: char = '/';

/// Field values shorter than this are treated as empty
pub const MIN_INPUT_LEN: usize = 8;

/// Cursor used when neither a displayed date nor the bridge is available
pub const FALLBACK_YEAR: u16 = 2080;
pub const FALLBACK_MONTH: u8 = 1;

/// Delay before re-running a forward sync that found the bridge unavailable
pub const RETRY_DELAY_MS: u64 = 500;
/// Upper bound on consecutive forward-sync retries per binding
pub const MAX_RETRIES: u32 = 40;
/// Shortest delay a retry, poll or re-render is scheduled with
pub const MIN_TIMER_DELAY_MS: u64 = 1;

/// Days per calendar grid row
pub const DAYS_PER_WEEK: usize = 7;
