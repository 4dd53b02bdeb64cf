//! Error types for the miso-calendar crate.

use chrono::NaiveDate;

/// Error type for all fallible operations in the miso-calendar crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a day-of-year value is outside the valid range 1..=366.
    #[error("invalid day of year: {doy} (must be 1..=366)")]
    InvalidDoy {
        /// The invalid day-of-year value that was provided.
        doy: u16,
    },

    /// Returned when a date string is not a valid `YYYYMMDD` date.
    #[error("invalid date '{input}': {reason}")]
    InvalidDateString {
        /// The string that failed to parse.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Returned when shifting a date leaves chrono's representable range.
    #[error("date overflow adding {days} days to {date}")]
    DateOverflow {
        /// The date being shifted.
        date: NaiveDate,
        /// The requested offset in days.
        days: i64,
    },

    /// Returned when a schedule parameter is zero.
    #[error("{name} must be >= 1, got {value}")]
    InvalidScheduleParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The invalid value.
        value: usize,
    },
}
