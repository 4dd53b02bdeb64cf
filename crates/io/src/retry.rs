//! Bounded retry settings for opening input files.

use std::time::Duration;

use crate::error::IoError;

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never sleeps.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Sets the total number of attempts, including the first.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the pause between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `attempts` is zero.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.attempts == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "retry attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let p = RetryPolicy::default()
            .with_attempts(5)
            .with_backoff(Duration::from_millis(10));
        assert_eq!(p.attempts(), 5);
        assert_eq!(p.backoff(), Duration::from_millis(10));
    }

    #[test]
    fn zero_attempts_invalid() {
        assert!(RetryPolicy::none().with_attempts(0).validate().is_err());
        assert!(RetryPolicy::none().validate().is_ok());
    }
}
