//! Time-lag embedding of a gridded anomaly series.

use chrono::NaiveDate;
use miso_grid::GriddedSeries;
use ndarray::{Array3, ArrayView2, Axis};
use tracing::debug;

use crate::error::EeofError;

/// Lag step and embedding dimension of the EEOF operator.
///
/// # Example
///
/// ```
/// use miso_eeof::EmbeddingConfig;
///
/// let config = EmbeddingConfig::new(1, 15).validate().unwrap();
/// assert_eq!(config.cut(), 14);
/// assert_eq!(config.lags(), (0..15).collect::<Vec<_>>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingConfig {
    tau: i64,
    embedding: usize,
}

impl EmbeddingConfig {
    /// Creates a config. Call [`validate`](Self::validate) before use.
    pub fn new(tau: i64, embedding: usize) -> Self {
        Self { tau, embedding }
    }

    /// Lag step in samples.
    pub fn tau(&self) -> i64 {
        self.tau
    }

    /// Number of lagged copies.
    pub fn embedding(&self) -> usize {
        self.embedding
    }

    /// Samples consumed by the largest lag: `(embedding - 1) * tau`.
    ///
    /// Saturates on overflow; only meaningful after validation.
    pub fn cut(&self) -> usize {
        let tau = usize::try_from(self.tau).unwrap_or(0);
        (self.embedding.saturating_sub(1)).saturating_mul(tau)
    }

    /// Lag labels `[0, tau, 2·tau, …]`.
    pub fn lags(&self) -> Vec<usize> {
        let tau = usize::try_from(self.tau).unwrap_or(0);
        (0..self.embedding).map(|k| k * tau).collect()
    }

    /// Checks `embedding >= 1` and `tau >= 0`.
    ///
    /// # Errors
    ///
    /// Returns [`EeofError::InvalidEmbedding`] or [`EeofError::InvalidTau`].
    pub fn validate(self) -> Result<Self, EeofError> {
        if self.embedding < 1 {
            return Err(EeofError::InvalidEmbedding {
                embedding: self.embedding,
            });
        }
        if self.tau < 0 {
            return Err(EeofError::InvalidTau { tau: self.tau });
        }
        Ok(self)
    }
}

/// A lag-embedded anomaly array of shape `(lag, time, lat)`.
///
/// `data[[k, t, y]]` holds the input value at sample `t + k·tau`. Column `t`
/// covers the window starting at `times()[t]` and ending at
/// `valid_times()[t]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedMatrix {
    lags: Vec<usize>,
    times: Vec<NaiveDate>,
    valid_times: Vec<NaiveDate>,
    lats: Vec<f64>,
    data: Array3<f64>,
}

impl EmbeddedMatrix {
    /// Lag labels.
    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    /// Time of the first (lag-zero) sample of each window.
    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    /// Time of the last sample of each window.
    pub fn valid_times(&self) -> &[NaiveDate] {
        &self.valid_times
    }

    /// Latitude axis.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// The `(lag, time, lat)` array.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// The `(time, lat)` slice at lag position `k`.
    pub fn lag(&self, k: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), k)
    }

    /// Number of lag positions.
    pub fn n_lags(&self) -> usize {
        self.lags.len()
    }

    /// Number of retained windows.
    pub fn n_times(&self) -> usize {
        self.times.len()
    }
}

/// Builds the lag embedding of `series`.
///
/// The last `(embedding - 1) * tau` samples have no complete window and are
/// dropped, so the result holds `len - cut` windows.
///
/// # Errors
///
/// Returns [`EeofError::InvalidEmbedding`] if `embedding == 0`,
/// [`EeofError::InvalidTau`] if `tau < 0`,
/// [`EeofError::InsufficientSamples`] if the cut leaves nothing, and
/// [`EeofError::TimeGap`] if the series skips a day, since lags are counted
/// in samples.
pub fn build_embedding(
    series: &GriddedSeries,
    tau: i64,
    embedding: usize,
) -> Result<EmbeddedMatrix, EeofError> {
    let config = EmbeddingConfig::new(tau, embedding).validate()?;
    let n_samples = series.len();

    let tau = usize::try_from(tau).map_err(|_| EeofError::InvalidTau { tau })?;
    let cut = (embedding - 1)
        .checked_mul(tau)
        .ok_or(EeofError::InsufficientSamples {
            cut: usize::MAX,
            n_samples,
        })?;
    if cut >= n_samples {
        return Err(EeofError::InsufficientSamples { cut, n_samples });
    }

    let times = series.times();
    if let Some(index) = times
        .windows(2)
        .position(|pair| (pair[1] - pair[0]).num_days() != 1)
    {
        return Err(EeofError::TimeGap {
            index: index + 1,
            previous: times[index],
            current: times[index + 1],
        });
    }

    let n_valid = n_samples - cut;
    let values = series.values();
    let data = Array3::from_shape_fn((embedding, n_valid, series.n_lat()), |(k, t, y)| {
        values[[t + k * tau, y]]
    });

    debug!(
        tau,
        embedding,
        cut,
        n_samples,
        n_valid,
        "lag embedding built"
    );

    Ok(EmbeddedMatrix {
        lags: config.lags(),
        times: series.times()[..n_valid].to_vec(),
        valid_times: series.times()[cut..].to_vec(),
        lats: series.lats().to_vec(),
        data,
    })
}
