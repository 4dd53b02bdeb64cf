//! Error types for miso-grid.

use chrono::NaiveDate;

/// Error type for all fallible operations in the miso-grid crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when an axis that must be populated is empty.
    #[error("axis '{name}' is empty")]
    EmptyAxis {
        /// Name of the empty axis.
        name: &'static str,
    },

    /// Returned when an array extent does not match its coordinate axis.
    #[error("shape mismatch on '{name}': expected {expected}, got {got}")]
    ShapeMismatch {
        /// Name of the axis.
        name: &'static str,
        /// Expected extent.
        expected: usize,
        /// Actual extent.
        got: usize,
    },

    /// Returned when time stamps are not strictly increasing.
    #[error("time axis not strictly increasing at index {index}: {previous} then {current}")]
    NonMonotonicTime {
        /// Index of the offending sample.
        index: usize,
        /// Time stamp before the offending sample.
        previous: NaiveDate,
        /// Offending time stamp.
        current: NaiveDate,
    },

    /// Returned when two latitude axes differ.
    #[error("latitude mismatch at index {index}: expected {expected}, got {got}")]
    LatMismatch {
        /// Index along the latitude axis.
        index: usize,
        /// Latitude on the reference grid.
        expected: f64,
        /// Latitude on the compared grid.
        got: f64,
    },

    /// Returned when a date window selects no samples.
    #[error("no samples between {start} and {end}")]
    EmptyWindow {
        /// First date of the window.
        start: NaiveDate,
        /// Last date of the window.
        end: NaiveDate,
    },
}
