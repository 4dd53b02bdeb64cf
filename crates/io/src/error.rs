//! Error types for miso-io.

use std::path::PathBuf;

use miso_anomaly::AnomalyError;
use miso_calendar::CalendarError;
use miso_eeof::EeofError;
use miso_grid::GridError;

/// Error type for all fallible operations in the miso-io crate.
///
/// This enum covers I/O failures, NetCDF library errors, malformed
/// coordinates and time axes, and domain errors raised while turning file
/// contents into typed series.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when every open attempt failed.
    #[error("failed to open {} after {attempts} attempt(s): {reason}", path.display())]
    RetriesExhausted {
        /// Path being opened.
        path: PathBuf,
        /// Number of attempts made.
        attempts: u32,
        /// Last failure.
        reason: String,
    },

    /// Returned when an existing output cannot be removed.
    #[error("cannot replace {}: {reason}", path.display())]
    Replace {
        /// Output path.
        path: PathBuf,
        /// Description of the filesystem failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a variable lacks a required dimension.
    #[error("variable '{variable}' has no '{name}' dimension")]
    MissingDimension {
        /// Canonical dimension name.
        name: &'static str,
        /// Variable inspected.
        variable: String,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when the region box selects nothing along an axis.
    #[error("region selects no {axis} values in {}", path.display())]
    EmptyRegion {
        /// `"lat"` or `"lon"`.
        axis: &'static str,
        /// File inspected.
        path: PathBuf,
    },

    /// Returned when a time value cannot be parsed or is out of range.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },

    /// Returned for a non-Gregorian time axis.
    #[error("unsupported calendar '{calendar}'")]
    UnsupportedCalendar {
        /// The `calendar` attribute value.
        calendar: String,
    },

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Anomaly(#[from] AnomalyError),

    #[error(transparent)]
    Eeof(#[from] EeofError),
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}
