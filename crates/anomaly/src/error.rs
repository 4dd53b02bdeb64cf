//! Error types for miso-anomaly.

use chrono::NaiveDate;
use miso_calendar::CalendarError;
use miso_grid::GridError;

/// Error type for all fallible operations in the miso-anomaly crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnomalyError {
    /// Returned when a date's day-of-year has no climatology entry.
    #[error("no climatology entry for day-of-year {doy} ({date}); table has {n_days} entries")]
    MissingDayOfYear {
        /// Day-of-year that was looked up.
        doy: u16,
        /// Date being converted.
        date: NaiveDate,
        /// Number of entries in the table.
        n_days: usize,
    },

    /// Returned when a table does not have 365 or 366 entries.
    #[error("climatology must have 365 or 366 day-of-year entries, got {n_days}")]
    InvalidTableLength {
        /// Number of entries supplied.
        n_days: usize,
    },

    /// Returned when a day-of-year is absent from a table being built.
    #[error("climatology has no entry for day-of-year {doy}")]
    IncompleteTable {
        /// First missing day-of-year.
        doy: u16,
    },

    /// Returned when a day-of-year appears more than once.
    #[error("climatology has duplicate entries for day-of-year {doy}")]
    DuplicateEntry {
        /// The repeated day-of-year.
        doy: u16,
    },

    /// Invalid day-of-year label.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Grid or shape problem.
    #[error(transparent)]
    Grid(#[from] GridError),
}
