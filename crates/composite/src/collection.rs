//! Named index series on a shared time axis, as written per mode.

use chrono::NaiveDate;
use miso_eeof::IndexSeries;

/// One mode's member series under their output variable names.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedCollection {
    name: String,
    variables: Vec<(String, IndexSeries)>,
}

impl NamedCollection {
    pub fn new(name: String, variables: Vec<(String, IndexSeries)>) -> Self {
        Self { name, variables }
    }

    /// Mode name, e.g. `MISO1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[(String, IndexSeries)] {
        &self.variables
    }

    /// Sorted union of every variable's dates.
    pub fn time_axis(&self) -> Vec<NaiveDate> {
        let mut times: Vec<NaiveDate> = self
            .variables
            .iter()
            .flat_map(|(_, s)| s.times().iter().copied())
            .collect();
        times.sort_unstable();
        times.dedup();
        times
    }

    /// Values of `series` placed on `axis`, NaN where the series has no date.
    pub fn values_on(series: &IndexSeries, axis: &[NaiveDate]) -> Vec<f64> {
        axis.iter()
            .map(|&date| series.get(date).unwrap_or(f64::NAN))
            .collect()
    }
}
