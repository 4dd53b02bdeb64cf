//! Undefined-value scanning.

use chrono::NaiveDate;

use crate::series::GriddedSeries;

/// One undefined (non-finite) value found in a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UndefinedSample {
    /// Time stamp of the sample.
    pub time: NaiveDate,
    /// Latitude of the sample.
    pub lat: f64,
}

/// Lists every non-finite value in `series`, in time-major order.
pub fn find_undefined(series: &GriddedSeries) -> Vec<UndefinedSample> {
    series
        .values()
        .indexed_iter()
        .filter(|(_, v)| !v.is_finite())
        .map(|((t, y), _)| UndefinedSample {
            time: series.times()[t],
            lat: series.lats()[y],
        })
        .collect()
}

/// Distinct time stamps carrying at least one non-finite value.
pub fn undefined_dates(series: &GriddedSeries) -> Vec<NaiveDate> {
    series
        .values()
        .outer_iter()
        .zip(series.times())
        .filter(|(row, _)| row.iter().any(|v| !v.is_finite()))
        .map(|(_, &t)| t)
        .collect()
}
