//! High-level NetCDF reader configuration and orchestration.

use std::path::Path;

use miso_anomaly::ClimatologyTable;
use miso_eeof::{EigenvectorSet, ScoreNormalizer};
use miso_grid::GriddedSeries;
use miso_stats::finite_mean;
use ndarray::{Array2, Array3, ArrayD, ArrayView3, Ix3};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read::{
    self, LAT_ALIASES, LON_ALIASES, LabeledArray, TIME_ALIASES, read_1d_f64, read_time_axis,
};
use crate::region::RegionBox;
use crate::retry::RetryPolicy;

const DOY_ALIASES: &[&str] = &["dayofyear", "doy"];
const MODE_ALIASES: &[&str] = &["mode"];
const LAG_ALIASES: &[&str] = &["embedding", "lag"];

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading gridded fields.
///
/// The [`Default`] implementation reduces over the precipitation box and
/// retries opens three times with a 500 ms pause.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    region: RegionBox,
    retry: RetryPolicy,
}

impl ReaderConfig {
    /// Set the latitude/longitude box to reduce over.
    pub fn with_region(mut self, region: RegionBox) -> Self {
        self.region = region;
        self
    }

    /// Set the retry policy for opening files.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn region(&self) -> &RegionBox {
        &self.region
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] for an invalid box or retry policy.
    pub fn validate(&self) -> Result<(), IoError> {
        self.region.validate()?;
        self.retry.validate()
    }
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

fn select_indices(
    coords: &[f64],
    keep: impl Fn(f64) -> bool,
    axis: &'static str,
    path: &Path,
) -> Result<Vec<usize>, IoError> {
    let idx: Vec<usize> = coords
        .iter()
        .enumerate()
        .filter(|&(_, &c)| keep(c))
        .map(|(i, _)| i)
        .collect();
    if idx.is_empty() {
        return Err(IoError::EmptyRegion {
            axis,
            path: path.to_path_buf(),
        });
    }
    Ok(idx)
}

/// Boxes a `(time, lat, lon)` cube and averages longitudes, skipping
/// undefined values. Returns the selected latitudes and a `(time, lat)`
/// array; a cell with no defined longitude is undefined.
fn reduce_box(
    cube: ArrayView3<'_, f64>,
    lats: &[f64],
    lons: &[f64],
    region: &RegionBox,
    path: &Path,
) -> Result<(Vec<f64>, Array2<f64>), IoError> {
    let (nt, ny, nx) = cube.dim();
    if lats.len() != ny {
        return Err(IoError::DimensionMismatch {
            name: "lat".to_string(),
            expected: ny,
            got: lats.len(),
        });
    }
    if lons.len() != nx {
        return Err(IoError::DimensionMismatch {
            name: "lon".to_string(),
            expected: nx,
            got: lons.len(),
        });
    }

    let lat_idx = select_indices(lats, |c| region.contains_lat(c), "lat", path)?;
    let lon_idx = select_indices(lons, |c| region.contains_lon(c), "lon", path)?;

    let values = Array2::from_shape_fn((nt, lat_idx.len()), |(t, j)| {
        finite_mean(lon_idx.iter().map(|&i| cube[[t, lat_idx[j], i]])).unwrap_or(f64::NAN)
    });
    let selected = lat_idx.iter().map(|&j| lats[j]).collect();
    Ok((selected, values))
}

fn into_cube(array: ArrayD<f64>) -> Result<Array3<f64>, IoError> {
    let ndim = array.ndim();
    array
        .into_dimensionality::<Ix3>()
        .map_err(|_| IoError::DimensionMismatch {
            name: "rank".to_string(),
            expected: 3,
            got: ndim,
        })
}

/// Reads `var` as a `(time, lat, lon)` cube and reduces it over the box.
fn read_boxed(
    file: &netcdf::File,
    raw: LabeledArray,
    leading: (&'static str, &[&str]),
    config: &ReaderConfig,
    path: &Path,
) -> Result<(Vec<f64>, Array2<f64>, String), IoError> {
    let (data, names) = raw.conform(&[leading, ("lat", LAT_ALIASES), ("lon", LON_ALIASES)])?;
    let cube = into_cube(data)?;
    let lats = read_1d_f64(file, &[names[1].as_str()], path)?;
    let lons = read_1d_f64(file, &[names[2].as_str()], path)?;
    let (lats, values) = reduce_box(cube.view(), &lats, &lons, &config.region, path)?;
    Ok((lats, values, names[0].clone()))
}

// ---------------------------------------------------------------------------
// Public readers
// ---------------------------------------------------------------------------

/// Read a daily gridded field and reduce it to a `(time, lat)` series.
///
/// The variable must have a time axis (`t` or `time`), a latitude axis
/// (`latitude` or `lat`) and a longitude axis (`longitude` or `lon`); any
/// other dimension must have length one. Used for forecast fields and the
/// lagged analysis alike.
///
/// # Errors
///
/// Returns [`IoError`] on a missing file or variable, a malformed time
/// axis, an empty region, or a non-increasing time axis.
pub fn read_field(path: &Path, var: &str, config: &ReaderConfig) -> Result<GriddedSeries, IoError> {
    config.validate()?;
    let file = netcdf_read::open_file(path, &config.retry)?;
    let raw = netcdf_read::read_variable(&file, var, path)?;

    let (lats, values, time_name) = read_boxed(&file, raw, ("time", TIME_ALIASES), config, path)?;
    let times = read_time_axis(&file, &time_name, path)?;
    let series = GriddedSeries::new(times, lats, values)?;

    debug!(
        path = %path.display(),
        variable = var,
        n_times = series.len(),
        n_lat = series.n_lat(),
        "field read"
    );
    Ok(series)
}

/// Read a climatology and build its day-of-year table.
///
/// A variable on a `dayofyear` axis is keyed directly by its labels. A
/// variable on a 365- or 366-sample time axis is treated as a single annual
/// cycle. Any other time axis is averaged by day-of-year using the file's
/// own dates.
///
/// # Errors
///
/// Returns [`IoError`] on I/O or shape problems and
/// [`IoError::Anomaly`] if the table is incomplete.
pub fn read_climatology(
    path: &Path,
    var: &str,
    config: &ReaderConfig,
) -> Result<ClimatologyTable, IoError> {
    config.validate()?;
    let file = netcdf_read::open_file(path, &config.retry)?;
    let raw = netcdf_read::read_variable(&file, var, path)?;

    let table = if raw.find_dim(DOY_ALIASES).is_some() {
        let (lats, values, doy_name) =
            read_boxed(&file, raw, ("dayofyear", DOY_ALIASES), config, path)?;
        let doys = read_1d_f64(&file, &[doy_name.as_str()], path)?
            .into_iter()
            .map(|d| {
                if d.fract() == 0.0 && (1.0..=366.0).contains(&d) {
                    Ok(d as u16)
                } else {
                    Err(IoError::Validation {
                        count: 1,
                        details: format!("invalid day-of-year label {d}"),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        ClimatologyTable::from_doy_profiles(&doys, lats, values)?
    } else {
        let (lats, values, time_name) =
            read_boxed(&file, raw, ("time", TIME_ALIASES), config, path)?;
        match values.nrows() {
            365 | 366 => ClimatologyTable::from_annual_cycle(lats, values)?,
            _ => {
                let times = read_time_axis(&file, &time_name, path)?;
                ClimatologyTable::from_daily_record(&GriddedSeries::new(times, lats, values)?)?
            }
        }
    };

    info!(
        path = %path.display(),
        variable = var,
        n_days = table.n_days(),
        n_lat = table.lats().len(),
        "climatology loaded"
    );
    Ok(table)
}

/// Read the EEOF patterns as a `(mode, lag, lat)` set.
///
/// Lag labels come from the lag coordinate variable when present, and are
/// otherwise taken as `k · tau`.
///
/// # Errors
///
/// Returns [`IoError`] on I/O problems, missing dimensions, or negative or
/// fractional lag labels.
pub fn read_eigenvectors(
    path: &Path,
    var: &str,
    tau: usize,
    retry: &RetryPolicy,
) -> Result<EigenvectorSet, IoError> {
    let file = netcdf_read::open_file(path, retry)?;
    let raw = netcdf_read::read_variable(&file, var, path)?;
    let (data, names) = raw.conform(&[
        ("mode", MODE_ALIASES),
        ("embedding", LAG_ALIASES),
        ("lat", LAT_ALIASES),
    ])?;
    let data = into_cube(data)?;
    let lats = read_1d_f64(&file, &[names[2].as_str()], path)?;

    let n_lags = data.dim().1;
    let lags = match file.variable(&names[1]) {
        Some(coord) => coord
            .get_values::<f64, _>(..)?
            .into_iter()
            .map(|l| {
                if l >= 0.0 && l.fract() == 0.0 {
                    Ok(l as usize)
                } else {
                    Err(IoError::Validation {
                        count: 1,
                        details: format!("invalid lag label {l}"),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => (0..n_lags).map(|k| k * tau).collect(),
    };

    let set = EigenvectorSet::new(lags, lats, data)?;
    info!(
        path = %path.display(),
        n_modes = set.n_modes(),
        n_lags = set.lags().len(),
        n_lat = set.lats().len(),
        "eigenvectors loaded"
    );
    Ok(set)
}

/// Read the per-mode score standard deviations.
///
/// # Errors
///
/// Returns [`IoError::DimensionMismatch`] if the variable has more than one
/// non-singleton dimension, and [`IoError::Eeof`] for non-positive values.
pub fn read_score_std(
    path: &Path,
    var: &str,
    retry: &RetryPolicy,
) -> Result<ScoreNormalizer, IoError> {
    let file = netcdf_read::open_file(path, retry)?;
    let raw = netcdf_read::read_variable(&file, var, path)?;
    let wide = raw.data.shape().iter().filter(|&&n| n > 1).count();
    if wide > 1 {
        return Err(IoError::DimensionMismatch {
            name: format!("{var} non-singleton dimensions"),
            expected: 1,
            got: wide,
        });
    }
    let std = raw.data.iter().copied().collect();
    Ok(ScoreNormalizer::new(std)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reduce_box_averages_longitudes_skipping_nan() {
        // t = 1, lat = 2, lon = 3
        let cube =
            Array3::from_shape_vec((1, 2, 3), vec![1.0, f64::NAN, 3.0, 10.0, 20.0, 99.0]).unwrap();
        let region = RegionBox {
            lat_min: -90.0,
            lat_max: 90.0,
            lon_min: 0.0,
            lon_max: 1.5,
        };
        let (lats, values) = reduce_box(
            cube.view(),
            &[5.0, 6.0],
            &[0.0, 1.0, 2.0],
            &region,
            Path::new("x.nc"),
        )
        .unwrap();
        assert_eq!(lats, vec![5.0, 6.0]);
        assert_relative_eq!(values[[0, 0]], 1.0);
        assert_relative_eq!(values[[0, 1]], 15.0);
    }

    #[test]
    fn reduce_box_all_nan_cell_is_undefined() {
        let cube = Array3::from_elem((2, 1, 2), f64::NAN);
        let (_, values) = reduce_box(
            cube.view(),
            &[0.0],
            &[70.0, 71.0],
            &RegionBox::PRECIP,
            Path::new("x.nc"),
        )
        .unwrap();
        assert!(values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn reduce_box_selects_descending_lats() {
        let cube = Array3::from_shape_fn((1, 4, 1), |(_, y, _)| y as f64);
        let (lats, values) = reduce_box(
            cube.view(),
            &[40.0, 20.0, 0.0, -20.0],
            &[80.0],
            &RegionBox::PRECIP,
            Path::new("x.nc"),
        )
        .unwrap();
        assert_eq!(lats, vec![20.0, 0.0]);
        assert_eq!(values.row(0).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn empty_region_is_an_error() {
        let cube = Array3::zeros((1, 1, 1));
        let err = reduce_box(
            cube.view(),
            &[0.0],
            &[0.0],
            &RegionBox::PRECIP,
            Path::new("x.nc"),
        )
        .unwrap_err();
        assert!(matches!(err, IoError::EmptyRegion { axis: "lon", .. }));
    }

    #[test]
    fn config_validate_rejects_bad_retry() {
        let config = ReaderConfig::default().with_retry(RetryPolicy::none().with_attempts(0));
        assert!(config.validate().is_err());
    }
}
