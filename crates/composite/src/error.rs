//! Error types for miso-composite.

use miso_eeof::EeofError;

/// Error type for all fallible operations in the miso-composite crate.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// Returned when a member label is inserted twice.
    #[error("duplicate composite member '{label}'")]
    DuplicateMember {
        /// The colliding label.
        label: String,
    },

    /// Returned when a member's series do not match the composite's modes.
    #[error("member '{label}' has {got} index series, expected {expected}")]
    ModeCountMismatch {
        /// Member label.
        label: String,
        /// Number of modes in the composite.
        expected: usize,
        /// Number of series supplied.
        got: usize,
    },

    /// Returned when a member's series is named differently from its mode.
    #[error("member '{label}' series {position} is named '{got}', expected '{expected}'")]
    ModeNameMismatch {
        /// Member label.
        label: String,
        /// Position within the member's series.
        position: usize,
        /// Mode name.
        expected: String,
        /// Series name.
        got: String,
    },

    /// Returned when a mode index is out of range.
    #[error("mode {mode} out of range for a composite of {n_modes} modes")]
    UnknownMode {
        /// Requested mode.
        mode: usize,
        /// Number of modes.
        n_modes: usize,
    },

    /// Returned when a composite with no members is averaged or summarized.
    #[error("composite has no members")]
    Empty,

    /// JSON serialization failure.
    #[error("serialization failed: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// Index series construction failure.
    #[error(transparent)]
    Index(#[from] EeofError),
}
