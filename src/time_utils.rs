// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and calendar-day arithmetic.
//!
//! All calendar days are UTC days, matching how post timestamps are stored.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{AppError, Result};

/// ISO calendar date format used for ledger keys.
pub const ACTIVITY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_activity_date(date: NaiveDate) -> String {
    date.format(ACTIVITY_DATE_FORMAT).to_string()
}

/// UTC calendar day a timestamp falls on.
pub fn activity_date(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

/// The calendar day before `date`, or `None` at the start of the calendar.
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Parse a post date given either as `YYYY-MM-DD` or as an RFC3339 timestamp.
///
/// Timestamps with an offset are converted to UTC before taking the day.
pub fn parse_activity_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, ACTIVITY_DATE_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| activity_date(dt.with_timezone(&Utc)))
        .map_err(|_| {
            AppError::InvalidInput(format!(
                "Invalid date '{}': expected YYYY-MM-DD or RFC3339 timestamp",
                raw
            ))
        })
}
