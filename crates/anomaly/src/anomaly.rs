//! Anomaly construction against a day-of-year climatology.

use chrono::NaiveDate;
use miso_grid::{AlignmentPolicy, GriddedSeries, LatAlignment, ensure_lats_match};
use ndarray::Array2;

use crate::climatology::ClimatologyTable;
use crate::error::AnomalyError;

/// A series expressed as departures from a day-of-year climatology.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalySeries(GriddedSeries);

impl AnomalySeries {
    /// Underlying series.
    pub fn as_series(&self) -> &GriddedSeries {
        &self.0
    }

    /// Restricts to the inclusive date window `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns a grid error if the window is empty.
    pub fn select_window(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, AnomalyError> {
        Ok(Self(self.0.select_window(start, end)?))
    }

    /// Prepends `history` to this anomaly along time.
    ///
    /// # Errors
    ///
    /// Returns a grid error if the grids differ or the times overlap.
    pub fn with_history(&self, history: &AnomalySeries) -> Result<Self, AnomalyError> {
        Ok(Self(history.0.concat(&self.0)?))
    }
}

/// Subtracts the climatology profile of each date's day-of-year.
///
/// The series and the table must already share the latitude axis; align
/// the table once with [`ClimatologyTable::aligned_to`] beforehand.
///
/// # Errors
///
/// Returns a grid error on a latitude mismatch and
/// [`AnomalyError::MissingDayOfYear`] if a date's day-of-year is absent
/// from the table.
pub fn compute_anomaly(
    series: &GriddedSeries,
    table: &ClimatologyTable,
) -> Result<AnomalySeries, AnomalyError> {
    ensure_lats_match(table.lats(), series.lats())?;

    let mut values = Array2::zeros(series.values().dim());
    for (t, &date) in series.times().iter().enumerate() {
        let profile = table.profile(date)?;
        let mut row = values.row_mut(t);
        row.assign(&series.row(t));
        row -= &profile;
    }
    Ok(AnomalySeries(series.with_values(values)?))
}

/// Aligns `table` onto the series grid under `policy`, then subtracts.
///
/// Convenient for one-off conversions; loops over many series on one grid
/// should align the table once and call [`compute_anomaly`].
///
/// # Errors
///
/// As [`compute_anomaly`], plus alignment failures under
/// [`AlignmentPolicy::Exact`].
pub fn compute_anomaly_aligned(
    series: &GriddedSeries,
    table: &ClimatologyTable,
    policy: AlignmentPolicy,
) -> Result<AnomalySeries, AnomalyError> {
    let alignment = LatAlignment::new(table.lats(), series.lats(), policy)?;
    compute_anomaly(series, &table.aligned_to(&alignment)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use miso_calendar::daily_sequence;
    use miso_grid::GridError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(lats: Vec<f64>) -> ClimatologyTable {
        let n_lat = lats.len();
        ClimatologyTable::from_annual_cycle(
            lats,
            Array2::from_shape_fn((366, n_lat), |(d, _)| (d + 1) as f64),
        )
        .unwrap()
    }

    #[test]
    fn subtracts_matching_doy() {
        let times = daily_sequence(date(2024, 1, 30), 3);
        let series =
            GriddedSeries::new(times.clone(), vec![1.0, 2.0], Array2::from_elem((3, 2), 100.0))
                .unwrap();
        let anom = compute_anomaly(&series, &table(vec![1.0, 2.0])).unwrap();
        assert_eq!(anom.as_series().times(), times.as_slice());
        assert_eq!(anom.as_series().row(0).to_vec(), vec![70.0, 70.0]);
        assert_eq!(anom.as_series().row(2).to_vec(), vec![68.0, 68.0]);
    }

    #[test]
    fn grid_mismatch_is_error() {
        let series = GriddedSeries::new(
            vec![date(2024, 6, 1)],
            vec![1.0, 2.5],
            Array2::zeros((1, 2)),
        )
        .unwrap();
        let err = compute_anomaly(&series, &table(vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(
            err,
            AnomalyError::Grid(GridError::LatMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn aligned_variant_snaps_grid() {
        let series = GriddedSeries::new(
            vec![date(2024, 6, 1)],
            vec![1.1, 2.4],
            Array2::from_elem((1, 2), 200.0),
        )
        .unwrap();
        let anom =
            compute_anomaly_aligned(&series, &table(vec![1.0, 2.0]), AlignmentPolicy::Nearest)
                .unwrap();
        // 2024-06-01 is day 153 in a leap year.
        assert_eq!(anom.as_series().row(0).to_vec(), vec![47.0, 47.0]);
        assert!(
            compute_anomaly_aligned(&series, &table(vec![1.0, 2.0]), AlignmentPolicy::Exact)
                .is_err()
        );
    }

    #[test]
    fn history_prepended() {
        let t = table(vec![0.0]);
        let hist = compute_anomaly(
            &GriddedSeries::new(daily_sequence(date(2024, 6, 1), 2), vec![0.0], Array2::zeros((2, 1)))
                .unwrap(),
            &t,
        )
        .unwrap();
        let fc = compute_anomaly(
            &GriddedSeries::new(daily_sequence(date(2024, 6, 3), 3), vec![0.0], Array2::zeros((3, 1)))
                .unwrap(),
            &t,
        )
        .unwrap();
        let joined = fc.with_history(&hist).unwrap();
        assert_eq!(joined.as_series().len(), 5);
        assert_eq!(joined.as_series().times()[0], date(2024, 6, 1));
        assert!(hist.with_history(&fc).is_err());
    }
}
