//! ISO 8601 timestamps for annotation records and file metadata.

use std::time::Duration;

const SECS_PER_DAY: u64 = 86_400;

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn now_iso8601() -> String {
    // web-time keeps this working on both native and WASM targets
    let since_epoch = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format_since_epoch(since_epoch)
}

/// Format a duration since the Unix epoch, truncated to milliseconds.
pub fn format_since_epoch(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_date(secs / SECS_PER_DAY);
    let secs_of_day = secs % SECS_PER_DAY;

    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        secs_of_day / 3600,
        secs_of_day % 3600 / 60,
        secs_of_day % 60,
        since_epoch.subsec_millis()
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
///
/// Works in 400-year eras starting on March 1st so the leap day is the last
/// day of each year and needs no special casing.
fn civil_date(days: u64) -> (u64, u64, u64) {
    // 1970-01-01 is day 719_468 counted from 0000-03-01
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    // Months counted from March
    let march_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * march_month + 2) / 5 + 1;
    let month = if march_month < 10 {
        march_month + 3
    } else {
        march_month - 9
    };
    let year = era * 400 + year_of_era + u64::from(month <= 2);
    (year, month, day)
}
