//! Daily date sequences.

use chrono::NaiveDate;

use crate::error::CalendarError;

/// Generates `n_days` consecutive daily dates starting at `start`.
///
/// Sequences stop early only at the end of chrono's representable range.
pub fn daily_sequence(start: NaiveDate, n_days: usize) -> Vec<NaiveDate> {
    start.iter_days().take(n_days).collect()
}

/// Shifts `date` by `days` (negative moves backward).
///
/// # Errors
///
/// Returns [`CalendarError::DateOverflow`] when the result is out of range.
pub fn offset_date(date: NaiveDate, days: i64) -> Result<NaiveDate, CalendarError> {
    date.checked_add_signed(chrono::TimeDelta::days(days))
        .ok_or(CalendarError::DateOverflow { date, days })
}
