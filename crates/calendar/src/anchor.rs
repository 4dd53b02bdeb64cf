//! Forecast anchor resolution.
//!
//! Forecasts are issued weekly; the anchor of a run is the most recent
//! Thursday on or before the requested date.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::CalendarError;

/// Parses a `YYYYMMDD` date string.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDateString`] unless `input` is exactly
/// eight ASCII digits forming a valid Gregorian date.
pub fn parse_yyyymmdd(input: &str) -> Result<NaiveDate, CalendarError> {
    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidDateString {
            input: input.to_string(),
            reason: "expected 8 digits (YYYYMMDD)".to_string(),
        });
    }
    NaiveDate::parse_from_str(input, "%Y%m%d").map_err(|e| CalendarError::InvalidDateString {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Returns the most recent Thursday on or before `date`.
pub fn latest_thursday(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64;
    let thursday = Weekday::Thu.num_days_from_monday() as i64;
    let days_since = (weekday - thursday).rem_euclid(7);
    date - chrono::TimeDelta::days(days_since)
}

/// Resolves the forecast anchor from an optional `YYYYMMDD` argument,
/// falling back to `today` when none is given.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDateString`] if `input` does not parse.
pub fn resolve_anchor(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let date = match input {
        Some(s) => parse_yyyymmdd(s)?,
        None => today,
    };
    Ok(latest_thursday(date))
}
