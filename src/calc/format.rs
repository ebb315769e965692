use crate::error::InputError;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Fixed-length month used for month grouping; not calendar months.
const DAYS_PER_MONTH: u64 = 30;

fn plural(n: u64, singular: &'static str, many: &'static str) -> &'static str {
    if n == 1 { singular } else { many }
}

/// Formats a signed day count, e.g. `"3 days"`, `"-1 day"`, `"1 month, 5 days"`.
///
/// With `use_month_grouping` and a magnitude of at least 30 days the value is
/// split into 30-day months plus a remainder; a zero remainder is omitted.
pub fn format_duration(days: i64, use_month_grouping: bool) -> String {
    let sign = if days < 0 { "-" } else { "" };
    let abs = days.unsigned_abs();

    if !use_month_grouping || abs < DAYS_PER_MONTH {
        return format!("{sign}{abs} {}", plural(abs, "day", "days"));
    }

    let months = abs / DAYS_PER_MONTH;
    let remainder = abs % DAYS_PER_MONTH;
    let month_word = plural(months, "month", "months");
    if remainder == 0 {
        format!("{sign}{months} {month_word}")
    } else {
        format!(
            "{sign}{months} {month_word}, {remainder} {}",
            plural(remainder, "day", "days")
        )
    }
}

/// `"Today"` when `date` is `today`, otherwise `"<Mon> <day>"`.
pub fn format_date_short(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    format!("{} {}", month_abbreviation(date.month()), date.day())
}

pub fn month_abbreviation(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_ABBREVIATIONS.get(i as usize))
        .copied()
        .unwrap_or("???")
}

/// `YYYY-MM-DD` from the calendar fields of `date` (already local).
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a date-picker value as local calendar fields. No timezone offset is
/// applied, so the result is the day the user typed.
pub fn parse_local_date(input: &str) -> Result<NaiveDate, InputError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(trimmed.to_string()))
}

/// Parses a host timestamp into local wall-clock time.
///
/// Date-only values are local calendar dates (midnight); offset-carrying
/// values are converted into the local zone. Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}
