//! The precomputed EEOF operator: eigenvectors and score normalization.

use miso_grid::{GridError, LatAlignment};
use ndarray::{Array3, ArrayView2, Axis};

use crate::error::EeofError;

/// Extended-EOF spatial patterns of shape `(mode, lag, lat)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvectorSet {
    lags: Vec<usize>,
    lats: Vec<f64>,
    data: Array3<f64>,
}

impl EigenvectorSet {
    /// Creates an eigenvector set.
    ///
    /// # Errors
    ///
    /// Returns [`EeofError::ShapeMismatch`] if the array does not have
    /// `(≥1, lags.len(), lats.len())` shape, or if there are no lags.
    pub fn new(lags: Vec<usize>, lats: Vec<f64>, data: Array3<f64>) -> Result<Self, EeofError> {
        let (n_modes, n_lags, n_lats) = data.dim();
        if n_modes == 0 {
            return Err(EeofError::ShapeMismatch {
                name: "mode",
                expected: 1,
                got: 0,
            });
        }
        if lags.is_empty() || n_lags != lags.len() {
            return Err(EeofError::ShapeMismatch {
                name: "embedding",
                expected: lags.len().max(1),
                got: n_lags,
            });
        }
        if lats.is_empty() {
            return Err(GridError::EmptyAxis { name: "lat" }.into());
        }
        if n_lats != lats.len() {
            return Err(EeofError::ShapeMismatch {
                name: "lat",
                expected: lats.len(),
                got: n_lats,
            });
        }
        Ok(Self { lags, lats, data })
    }

    pub fn n_modes(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// The `(lag, lat)` pattern of zero-based mode `m`.
    pub fn mode(&self, m: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), m)
    }

    /// Reindexes the latitude axis through `alignment`.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::ShapeMismatch`] from the alignment.
    pub fn aligned_to(&self, alignment: &LatAlignment) -> Result<Self, EeofError> {
        let data = alignment.apply(&self.data, Axis(2))?;
        Ok(Self {
            lags: self.lags.clone(),
            lats: alignment.target().to_vec(),
            data,
        })
    }
}

/// Per-mode standard deviations of the reference scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreNormalizer {
    std: Vec<f64>,
}

impl ScoreNormalizer {
    /// # Errors
    ///
    /// Returns [`EeofError::InvalidScoreStd`] for any value that is not
    /// finite and strictly positive, and [`EeofError::ShapeMismatch`] when
    /// `std` is empty.
    pub fn new(std: Vec<f64>) -> Result<Self, EeofError> {
        if std.is_empty() {
            return Err(EeofError::ShapeMismatch {
                name: "mode",
                expected: 1,
                got: 0,
            });
        }
        if let Some((mode, &value)) = std
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(EeofError::InvalidScoreStd { mode, value });
        }
        Ok(Self { std })
    }

    pub fn n_modes(&self) -> usize {
        self.std.len()
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }
}
