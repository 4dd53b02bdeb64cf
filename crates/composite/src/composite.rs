//! The per-run composite of index series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use miso_eeof::IndexSeries;
use miso_stats::mean;
use tracing::debug;

use crate::collection::NamedCollection;
use crate::error::CompositeError;
use crate::key::MemberKey;

/// Index series for every (initialization, member) pair of a run.
///
/// Each member holds one series per mode, in mode order. Members iterate in
/// [`MemberKey`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    modes: Vec<String>,
    members: BTreeMap<MemberKey, Vec<IndexSeries>>,
}

impl Composite {
    /// Creates an empty composite for the named modes.
    pub fn new(modes: Vec<String>) -> Self {
        Self {
            modes,
            members: BTreeMap::new(),
        }
    }

    /// Adds one member's per-mode series.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::DuplicateMember`] if the key is already
    /// present, and [`CompositeError::ModeCountMismatch`] or
    /// [`CompositeError::ModeNameMismatch`] if `series` does not line up
    /// with the composite's modes.
    pub fn insert(&mut self, key: MemberKey, series: Vec<IndexSeries>) -> Result<(), CompositeError> {
        if self.members.contains_key(&key) {
            return Err(CompositeError::DuplicateMember { label: key.label() });
        }
        if series.len() != self.modes.len() {
            return Err(CompositeError::ModeCountMismatch {
                label: key.label(),
                expected: self.modes.len(),
                got: series.len(),
            });
        }
        for (position, (s, mode)) in series.iter().zip(&self.modes).enumerate() {
            if s.name() != mode {
                return Err(CompositeError::ModeNameMismatch {
                    label: key.label(),
                    position,
                    expected: mode.clone(),
                    got: s.name().to_string(),
                });
            }
        }
        self.members.insert(key, series);
        Ok(())
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MemberKey> {
        self.members.keys()
    }

    /// Series of `key` for zero-based `mode`.
    pub fn get(&self, key: &MemberKey, mode: usize) -> Option<&IndexSeries> {
        self.members.get(key).and_then(|s| s.get(mode))
    }

    fn check_mode(&self, mode: usize) -> Result<(), CompositeError> {
        if mode >= self.modes.len() {
            return Err(CompositeError::UnknownMode {
                mode,
                n_modes: self.modes.len(),
            });
        }
        Ok(())
    }

    /// The named collection of all members for `mode`.
    ///
    /// Variables are named `<mode>_<label>`, e.g. `MISO1_20240609T0000Z_mem1`.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::UnknownMode`] for an out-of-range mode.
    pub fn collection(&self, mode: usize) -> Result<NamedCollection, CompositeError> {
        self.check_mode(mode)?;
        let name = &self.modes[mode];
        let variables = self
            .members
            .iter()
            .map(|(key, series)| (format!("{name}_{}", key.label()), series[mode].clone()))
            .collect();
        Ok(NamedCollection::new(name.clone(), variables))
    }

    fn values_by_date(&self, mode: usize) -> BTreeMap<NaiveDate, Vec<f64>> {
        let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for series in self.members.values() {
            for (date, value) in series[mode].iter() {
                by_date.entry(date).or_default().push(value);
            }
        }
        by_date
    }

    /// Unweighted ensemble mean of `mode`, aligned by calendar date.
    ///
    /// Each date averages only the members that have it. Undefined member
    /// values are not skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::UnknownMode`] or [`CompositeError::Empty`].
    pub fn ensemble_mean(&self, mode: usize) -> Result<IndexSeries, CompositeError> {
        self.check_mode(mode)?;
        if self.is_empty() {
            return Err(CompositeError::Empty);
        }
        let by_date = self.values_by_date(mode);
        let (times, values): (Vec<_>, Vec<_>) = by_date
            .into_iter()
            .map(|(date, values)| (date, mean(&values)))
            .unzip();
        debug!(
            mode = %self.modes[mode],
            n_members = self.len(),
            n_dates = times.len(),
            "ensemble mean computed"
        );
        Ok(IndexSeries::new(self.modes[mode].clone(), times, values)?)
    }

    /// Number of members contributing to each date of `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::UnknownMode`].
    pub fn coverage(&self, mode: usize) -> Result<Vec<(NaiveDate, usize)>, CompositeError> {
        self.check_mode(mode)?;
        Ok(self
            .values_by_date(mode)
            .into_iter()
            .map(|(date, values)| (date, values.len()))
            .collect())
    }
}
