// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for timestamps, calendar days, and week arithmetic.
//!
//! All stored timestamps are UTC; calendar days (daily rollups, reports,
//! donation dates) are derived in UTC as well.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc, Weekday};

use crate::error::AppError;

/// Accepted non-RFC3339 timestamp layouts, interpreted as UTC.
const FALLBACK_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an ISO-ish timestamp into UTC.
///
/// RFC3339 is tried first; the bare `YYYY-MM-DD HH:MM:SS` layouts some
/// clients send are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in FALLBACK_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(AppError::InvalidInput(format!(
        "Invalid timestamp: {}",
        raw
    )))
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// RFC3339 timestamp for midnight UTC of `day`.
pub fn day_start(day: NaiveDate) -> String {
    format_utc_rfc3339(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Monday-first ordinal for a weekday (Mon=0 .. Sun=6).
///
/// Written out as a table so the report indexing convention is pinned down
/// by tests directly instead of being derived at call sites.
pub fn monday_first_index(weekday: Weekday) -> usize {
    match weekday {
        Weekday::Mon => 0,
        Weekday::Tue => 1,
        Weekday::Wed => 2,
        Weekday::Thu => 3,
        Weekday::Fri => 4,
        Weekday::Sat => 5,
        Weekday::Sun => 6,
    }
}

/// Monday..Sunday bounds (inclusive) of the week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = day - Duration::days(monday_first_index(day.weekday()) as i64);
    (monday, monday + Duration::days(6))
}

/// First and last day (inclusive) of the given month.
///
/// Returns `None` for months outside 1..=12 or years chrono cannot
/// represent.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next - Duration::days(1)))
}
