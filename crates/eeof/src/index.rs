//! Named daily index series.

use chrono::NaiveDate;

use crate::error::EeofError;

/// Name of the index for zero-based mode `mode`: `MISO1`, `MISO2`, ….
pub fn mode_name(mode: usize) -> String {
    format!("MISO{}", mode + 1)
}

/// A named scalar series on a strictly increasing daily axis.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeries {
    name: String,
    times: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl IndexSeries {
    /// Creates an index series.
    ///
    /// # Errors
    ///
    /// Returns [`EeofError::ShapeMismatch`] if lengths differ and
    /// [`EeofError::UnorderedIndexTimes`] if times are not strictly
    /// increasing.
    pub fn new(
        name: impl Into<String>,
        times: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, EeofError> {
        let name = name.into();
        if times.len() != values.len() {
            return Err(EeofError::ShapeMismatch {
                name: "time",
                expected: times.len(),
                got: values.len(),
            });
        }
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EeofError::UnorderedIndexTimes {
                name,
                index: index + 1,
            });
        }
        Ok(Self {
            name,
            times,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on `date`, if the series covers it.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.times
            .binary_search(&date)
            .ok()
            .map(|i| self.values[i])
    }

    /// `(date, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Replaces the time axis, keeping values. Used to stamp scores with
    /// forecast dates.
    ///
    /// # Errors
    ///
    /// Same conditions as [`IndexSeries::new`].
    pub fn restamped(&self, times: Vec<NaiveDate>) -> Result<Self, EeofError> {
        Self::new(self.name.clone(), times, self.values.clone())
    }
}
