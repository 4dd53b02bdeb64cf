//! Time × latitude series.

use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1, Axis, concatenate, s};

use crate::align::ensure_lats_match;
use crate::error::GridError;

/// A scalar field on a time × latitude grid.
///
/// Invariants, checked at construction:
/// - the time axis is non-empty and strictly increasing (hence unique);
/// - the latitude axis is non-empty;
/// - `values` has shape `(times.len(), lats.len())`.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedSeries {
    times: Vec<NaiveDate>,
    lats: Vec<f64>,
    values: Array2<f64>,
}

impl GriddedSeries {
    /// Creates a series after validating axes and shape.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyAxis`], [`GridError::ShapeMismatch`] or
    /// [`GridError::NonMonotonicTime`] when an invariant does not hold.
    pub fn new(
        times: Vec<NaiveDate>,
        lats: Vec<f64>,
        values: Array2<f64>,
    ) -> Result<Self, GridError> {
        if times.is_empty() {
            return Err(GridError::EmptyAxis { name: "time" });
        }
        if lats.is_empty() {
            return Err(GridError::EmptyAxis { name: "lat" });
        }
        let (nt, ny) = values.dim();
        if nt != times.len() {
            return Err(GridError::ShapeMismatch {
                name: "time",
                expected: times.len(),
                got: nt,
            });
        }
        if ny != lats.len() {
            return Err(GridError::ShapeMismatch {
                name: "lat",
                expected: lats.len(),
                got: ny,
            });
        }
        for (i, pair) in times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(GridError::NonMonotonicTime {
                    index: i + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self {
            times,
            lats,
            values,
        })
    }

    /// Time stamps, strictly increasing.
    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    /// Latitude coordinates.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Values with shape `(time, lat)`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of time samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` when there are no samples (never after [`new`](Self::new)).
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of latitudes.
    pub fn n_lat(&self) -> usize {
        self.lats.len()
    }

    /// Spatial profile at time index `t`.
    pub fn row(&self, t: usize) -> ArrayView1<'_, f64> {
        self.values.row(t)
    }

    /// Restricts the series to the inclusive date window `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyWindow`] if no sample falls in the window.
    pub fn select_window(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, GridError> {
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t <= end);
        if lo >= hi {
            return Err(GridError::EmptyWindow { start, end });
        }
        Ok(Self {
            times: self.times[lo..hi].to_vec(),
            lats: self.lats.clone(),
            values: self.values.slice(s![lo..hi, ..]).to_owned(),
        })
    }

    /// Places the series on the time axis `times`.
    ///
    /// Rows for dates absent from `self` are filled with NaN; samples whose
    /// date is not in `times` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyAxis`] or [`GridError::NonMonotonicTime`]
    /// if `times` is empty or not strictly increasing.
    pub fn reindex(&self, times: &[NaiveDate]) -> Result<Self, GridError> {
        let mut values = Array2::from_elem((times.len(), self.n_lat()), f64::NAN);
        for (row, date) in times.iter().enumerate() {
            if let Ok(src) = self.times.binary_search(date) {
                values.row_mut(row).assign(&self.values.row(src));
            }
        }
        Self::new(times.to_vec(), self.lats.clone(), values)
    }

    /// Appends `later` after `self` along time.
    ///
    /// Both series must share the latitude axis exactly and every time in
    /// `later` must follow the last time of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LatMismatch`] / [`GridError::ShapeMismatch`] on a
    /// grid mismatch and [`GridError::NonMonotonicTime`] on overlapping time.
    pub fn concat(&self, later: &GriddedSeries) -> Result<Self, GridError> {
        ensure_lats_match(&self.lats, &later.lats)?;
        let mut times = self.times.clone();
        times.extend_from_slice(&later.times);
        let values = concatenate(Axis(0), &[self.values.view(), later.values.view()])
            .map_err(|_| GridError::ShapeMismatch {
                name: "lat",
                expected: self.n_lat(),
                got: later.n_lat(),
            })?;
        Self::new(times, self.lats.clone(), values)
    }

    /// Returns a copy with `values` replaced, keeping both axes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the new values have a
    /// different shape.
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self, GridError> {
        if values.dim() != self.values.dim() {
            let (nt, ny) = values.dim();
            return Err(if nt != self.len() {
                GridError::ShapeMismatch {
                    name: "time",
                    expected: self.len(),
                    got: nt,
                }
            } else {
                GridError::ShapeMismatch {
                    name: "lat",
                    expected: self.n_lat(),
                    got: ny,
                }
            });
        }
        Ok(Self {
            times: self.times.clone(),
            lats: self.lats.clone(),
            values,
        })
    }
}
