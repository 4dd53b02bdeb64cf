//! Error types for miso-eeof.

use chrono::NaiveDate;
use miso_grid::GridError;

/// Error type for all fallible operations in the miso-eeof crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EeofError {
    /// Returned when the embedding dimension is below one.
    #[error("embedding dimension must be at least 1, got {embedding}")]
    InvalidEmbedding {
        /// The invalid embedding dimension.
        embedding: usize,
    },

    /// Returned when the lag step is negative.
    #[error("time lag tau cannot be negative, got {tau}")]
    InvalidTau {
        /// The invalid lag step.
        tau: i64,
    },

    /// Returned when trimming the lag history leaves no samples.
    #[error(
        "insufficient samples: cannot cut {cut} samples from a series of {n_samples} \
         (check tau and embedding)"
    )]
    InsufficientSamples {
        /// Number of samples the largest lag removes.
        cut: usize,
        /// Number of samples in the input series.
        n_samples: usize,
    },

    /// Returned when an axis length disagrees between operands.
    #[error("shape mismatch on '{name}': expected {expected}, got {got}")]
    ShapeMismatch {
        /// Name of the axis.
        name: &'static str,
        /// Expected extent.
        expected: usize,
        /// Actual extent.
        got: usize,
    },

    /// Returned when lag labels disagree between operands.
    #[error("lag mismatch at index {index}: expected {expected}, got {got}")]
    LagMismatch {
        /// Position along the lag axis.
        index: usize,
        /// Lag on the eigenvector set.
        expected: usize,
        /// Lag on the embedded matrix.
        got: usize,
    },

    /// Returned when a score standard deviation is not finite and positive.
    #[error("score standard deviation for mode {mode} must be finite and positive, got {value}")]
    InvalidScoreStd {
        /// Zero-based mode index.
        mode: usize,
        /// The invalid value.
        value: f64,
    },

    /// Returned when an index series' time axis is not strictly increasing.
    #[error("index series '{name}' time axis not strictly increasing at index {index}")]
    UnorderedIndexTimes {
        /// Series name.
        name: String,
        /// Offending position.
        index: usize,
    },

    /// Returned when consecutive samples are not one day apart.
    #[error("time axis is not daily: {previous} is followed by {current} at index {index}")]
    TimeGap {
        /// Position of the later sample.
        index: usize,
        /// Earlier date.
        previous: NaiveDate,
        /// Later date.
        current: NaiveDate,
    },

    /// Grid or latitude problem.
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_samples() {
        let err = EeofError::InsufficientSamples {
            cut: 40,
            n_samples: 30,
        };
        assert!(err.to_string().starts_with(
            "insufficient samples: cannot cut 40 samples from a series of 30"
        ));
    }

    #[test]
    fn display_invalid_tau() {
        let err = EeofError::InvalidTau { tau: -1 };
        assert_eq!(err.to_string(), "time lag tau cannot be negative, got -1");
    }

    #[test]
    fn display_lag_mismatch() {
        let err = EeofError::LagMismatch {
            index: 3,
            expected: 3,
            got: 6,
        };
        assert_eq!(err.to_string(), "lag mismatch at index 3: expected 3, got 6");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<EeofError>();
    }
}
