//! Lenient parsing and display of the timestamp strings carried by work orders.
//!
//! Work order data arrives from JSON files that were produced by several tools over
//! time, so dates show up as RFC 3339 instants, naive date-times, or bare dates.
//! Anything that is not understood parses to `None` instead of failing.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// True when the value is missing or contains only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|raw| raw.trim().is_empty())
}

/// Parse a timestamp string. Values without an explicit offset are read as local
/// time in `offset`; bare dates resolve to local midnight.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return local_to_utc(naive, offset);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| local_to_utc(date.and_time(NaiveTime::MIN), offset))
}

/// True when the value is in one of the accepted formats. The result does not depend
/// on the local offset, so callers without a calendar can check data before classifying.
pub fn is_readable(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty()
        && (DateTime::parse_from_rfc3339(trimmed).is_ok()
            || NAIVE_DATE_TIME_FORMATS
                .iter()
                .any(|format| NaiveDateTime::parse_from_str(trimmed, format).is_ok())
            || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok())
}

/// Parse an optional timestamp, treating blank values as absent.
pub fn parse_optional(raw: Option<&str>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    raw.and_then(|value| parse_timestamp(value, offset))
}

pub(crate) fn local_to_utc(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    naive
        .and_local_timezone(offset)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Display form used on work order cards, e.g. `Jul 03, 2025`.
pub fn format_date(raw: Option<&str>, offset: FixedOffset) -> String {
    if is_blank(raw) {
        return "Pending".to_string();
    }
    match parse_optional(raw, offset) {
        Some(instant) => format_instant(instant, offset),
        None => "Invalid date".to_string(),
    }
}

pub fn format_instant(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%b %d, %Y").to_string()
}

/// Coarse relative description of a due date, e.g. `in 3 days` or `2 weeks ago`.
pub fn format_relative(raw: Option<&str>, now: DateTime<Utc>, offset: FixedOffset) -> String {
    if is_blank(raw) {
        return "No due date set".to_string();
    }
    let Some(instant) = parse_optional(raw, offset) else {
        return "Invalid date".to_string();
    };

    let delta = instant - now;
    let days = delta.num_days();
    let phrase = match days.abs() {
        0 => return "today".to_string(),
        1 => "1 day".to_string(),
        n if n < 14 => format!("{n} days"),
        n if n < 60 => format!("{} weeks", n / 7),
        n if n < 730 => format!("{} months", n / 30),
        n => format!("{} years", n / 365),
    };
    if days > 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}
