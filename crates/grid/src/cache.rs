//! Latitude alignments computed once per source axis.

use std::sync::{Arc, Mutex, PoisonError};

use crate::align::{AlignmentPolicy, LAT_TOLERANCE, LatAlignment};
use crate::error::GridError;

/// Alignments onto one target axis, computed once per distinct source axis.
///
/// Safe to share across threads; each source grid is resolved on first use.
#[derive(Debug)]
pub struct AlignmentCache {
    target: Vec<f64>,
    policy: AlignmentPolicy,
    entries: Mutex<Vec<(Vec<f64>, Arc<LatAlignment>)>>,
}

fn same_axis(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= LAT_TOLERANCE)
}

impl AlignmentCache {
    pub fn new(target: Vec<f64>, policy: AlignmentPolicy) -> Self {
        Self {
            target,
            policy,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    /// Alignment of `source` onto the target, computing it on first request.
    ///
    /// # Errors
    ///
    /// Whatever [`LatAlignment::new`] reports for a new source axis.
    pub fn get(&self, source: &[f64]) -> Result<Arc<LatAlignment>, GridError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, alignment)) = entries.iter().find(|(s, _)| same_axis(s, source)) {
            return Ok(Arc::clone(alignment));
        }
        let alignment = Arc::new(LatAlignment::new(source, &self.target, self.policy)?);
        entries.push((source.to_vec(), Arc::clone(&alignment)));
        Ok(alignment)
    }

    /// Number of distinct source axes seen so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
