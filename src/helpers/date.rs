//! Date helper functions

use chrono::{DateTime, Datelike, Utc};

use crate::i18n::Locale;

/// Format a date as `dd Mon yyyy` using the locale's month abbreviations
///
/// # Examples
/// ```ignore
/// format_date(&date, Locale::PtBr) // -> "15 mar 2021"
/// ```
pub fn format_date(date: &DateTime<Utc>, locale: Locale) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        locale.month_abbr(date.month()),
        date.year()
    )
}

/// Format a date in ISO 8601 / XML format, for `datetime` attributes
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
