/// Timestamp helpers: CLI date parsing and CSV/log formatting.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

/// Converts a `YYYYMMDD` date and `HHMM` time, read as local time, into a
/// UNIX timestamp.
///
/// Invalid input yields `None` after an error-level log record that quotes
/// the rejected date and time, so a bad CLI argument is visible in the run
/// log. During a DST fold the earlier instant is chosen; a time inside a
/// DST gap is rejected the same way.
pub fn convert_to_unix_timestamp(date: &str, time: &str) -> Option<i64> {
    let parsed = NaiveDate::parse_from_str(date, "%Y%m%d")
        .and_then(|d| NaiveTime::parse_from_str(time, "%H%M").map(|t| d.and_time(t)));

    let naive = match parsed {
        Ok(naive) => naive,
        Err(e) => {
            log::error!(
                "Invalid input format '{} {}' ({}). Provide date as YYYYMMDD and time as HHMM.",
                date,
                time,
                e
            );
            return None;
        }
    };

    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Some(local.timestamp()),
        None => {
            log::error!("{} {} does not exist in the local timezone", date, time);
            None
        }
    }
}

/// Formats a UNIX timestamp as `YYYYMMDDHHMM` in UTC.
pub fn format_acquisition_time(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y%m%d%H%M").to_string())
}

/// Formats a duration in seconds as `H:MM:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    let (m, s) = (seconds / 60, seconds % 60);
    let (h, m) = (m / 60, m % 60);
    format!("{}:{:02}:{:02}", h, m, s)
}
