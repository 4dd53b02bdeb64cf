//! Latitude alignment between grids.

use ndarray::{Array, ArrayBase, Axis, Data, RemoveAxis};
use tracing::debug;

use crate::error::GridError;
use crate::series::GriddedSeries;

/// Absolute tolerance (degrees) under which two latitudes are equal.
pub const LAT_TOLERANCE: f64 = 1e-6;

/// How a source latitude axis is reconciled with a target axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Axes must already be identical.
    #[default]
    Exact,
    /// Every target latitude takes the value of the nearest source latitude.
    Nearest,
}

/// Checks that two latitude axes are identical within [`LAT_TOLERANCE`].
///
/// # Errors
///
/// Returns [`GridError::ShapeMismatch`] on differing lengths and
/// [`GridError::LatMismatch`] at the first differing latitude.
pub fn ensure_lats_match(expected: &[f64], got: &[f64]) -> Result<(), GridError> {
    if expected.len() != got.len() {
        return Err(GridError::ShapeMismatch {
            name: "lat",
            expected: expected.len(),
            got: got.len(),
        });
    }
    for (index, (&e, &g)) in expected.iter().zip(got).enumerate() {
        if (e - g).abs() > LAT_TOLERANCE {
            return Err(GridError::LatMismatch {
                index,
                expected: e,
                got: g,
            });
        }
    }
    Ok(())
}

/// A precomputed mapping from a source latitude axis onto a target axis.
///
/// Build it once per source grid and apply it to every array on that grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LatAlignment {
    source_len: usize,
    indices: Vec<usize>,
    target: Vec<f64>,
    max_offset: f64,
}

impl LatAlignment {
    /// Computes the alignment of `source` onto `target` under `policy`.
    ///
    /// With [`AlignmentPolicy::Nearest`], ties resolve to the lower source
    /// index.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyAxis`] if either axis is empty, and under
    /// [`AlignmentPolicy::Exact`] whatever [`ensure_lats_match`] reports.
    pub fn new(source: &[f64], target: &[f64], policy: AlignmentPolicy) -> Result<Self, GridError> {
        if source.is_empty() {
            return Err(GridError::EmptyAxis { name: "lat" });
        }
        if target.is_empty() {
            return Err(GridError::EmptyAxis { name: "lat" });
        }

        let indices = match policy {
            AlignmentPolicy::Exact => {
                ensure_lats_match(target, source)?;
                (0..source.len()).collect()
            }
            AlignmentPolicy::Nearest => target
                .iter()
                .map(|&t| {
                    let mut best = 0;
                    for (i, &s) in source.iter().enumerate() {
                        if (s - t).abs() < (source[best] - t).abs() {
                            best = i;
                        }
                    }
                    best
                })
                .collect::<Vec<_>>(),
        };

        let max_offset = indices
            .iter()
            .zip(target)
            .map(|(&i, &t)| (source[i] - t).abs())
            .fold(0.0, f64::max);
        debug!(
            n_source = source.len(),
            n_target = target.len(),
            max_offset,
            "latitude alignment computed"
        );

        Ok(Self {
            source_len: source.len(),
            indices,
            target: target.to_vec(),
            max_offset,
        })
    }

    /// Target latitude axis.
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// For each target latitude, the source index it reads from.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Largest distance (degrees) between a target latitude and its source.
    pub fn max_offset(&self) -> f64 {
        self.max_offset
    }

    /// Reindexes `array` along `axis` onto the target latitudes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if `axis` does not have the
    /// source length.
    pub fn apply<S, D>(&self, array: &ArrayBase<S, D>, axis: Axis) -> Result<Array<f64, D>, GridError>
    where
        S: Data<Elem = f64>,
        D: RemoveAxis,
    {
        let len = array.len_of(axis);
        if len != self.source_len {
            return Err(GridError::ShapeMismatch {
                name: "lat",
                expected: self.source_len,
                got: len,
            });
        }
        Ok(array.select(axis, &self.indices))
    }

    /// Reindexes a whole series onto the target latitudes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the series is not on the
    /// source grid.
    pub fn apply_series(&self, series: &GriddedSeries) -> Result<GriddedSeries, GridError> {
        let values = self.apply(series.values(), Axis(1))?;
        GriddedSeries::new(series.times().to_vec(), self.target.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, array};

    #[test]
    fn exact_identity() {
        let a = LatAlignment::new(&[1.0, 2.0], &[1.0, 2.0], AlignmentPolicy::Exact).unwrap();
        assert_eq!(a.indices(), &[0, 1]);
        assert_eq!(a.max_offset(), 0.0);
    }

    #[test]
    fn exact_rejects_offset_grid() {
        let err = LatAlignment::new(&[1.0, 2.0], &[1.0, 2.5], AlignmentPolicy::Exact).unwrap_err();
        assert_eq!(
            err,
            GridError::LatMismatch {
                index: 1,
                expected: 2.5,
                got: 2.0
            }
        );
    }

    #[test]
    fn nearest_snaps_and_reorders() {
        // Descending source, ascending target.
        let source = [30.5, 29.5, 28.5];
        let target = [28.4, 29.6, 30.0];
        let a = LatAlignment::new(&source, &target, AlignmentPolicy::Nearest).unwrap();
        assert_eq!(a.indices(), &[2, 1, 0]);
        assert!((a.max_offset() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn nearest_tie_takes_lower_index() {
        let a = LatAlignment::new(&[0.0, 1.0], &[0.5], AlignmentPolicy::Nearest).unwrap();
        assert_eq!(a.indices(), &[0]);
    }

    #[test]
    fn apply_along_last_axis() {
        let a = LatAlignment::new(&[0.0, 1.0, 2.0], &[2.0, 0.0], AlignmentPolicy::Nearest).unwrap();
        let data = Array3::from_shape_fn((2, 2, 3), |(m, k, y)| (m * 100 + k * 10 + y) as f64);
        let out = a.apply(&data, Axis(2)).unwrap();
        assert_eq!(out.dim(), (2, 2, 2));
        assert_eq!(out[[1, 1, 0]], 112.0);
        assert_eq!(out[[1, 1, 1]], 110.0);
    }

    #[test]
    fn apply_rejects_wrong_length() {
        let a = LatAlignment::new(&[0.0, 1.0], &[0.0], AlignmentPolicy::Nearest).unwrap();
        let data = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            a.apply(&data, Axis(1)),
            Err(GridError::ShapeMismatch { expected: 2, got: 3, .. })
        ));
    }

    #[test]
    fn ensure_lats_match_length() {
        assert!(matches!(
            ensure_lats_match(&[1.0], &[1.0, 2.0]),
            Err(GridError::ShapeMismatch { .. })
        ));
        assert!(ensure_lats_match(&[1.0, 2.0], &[1.0, 2.0 + 1e-9]).is_ok());
    }
}
