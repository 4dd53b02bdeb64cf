//! Integration tests for reading forecast fields, climatologies and the
//! EEOF operator from programmatically built NetCDF files.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use chrono::NaiveDate;
use miso_io::{
    IoError, ReaderConfig, RegionBox, RetryPolicy, read_climatology, read_eigenvectors,
    read_field, read_score_std,
};
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// Helper: programmatic NetCDF fixture builder
// ---------------------------------------------------------------------------

/// Configuration for building a minimal gridded NetCDF fixture.
struct FixtureBuilder {
    var: String,
    time_dim: String,
    time_units: String,
    calendar: Option<String>,
    times: Vec<f64>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    /// Insert a singleton `surface` axis after time.
    surface: bool,
    /// Flat data in `[t, lat, lon]` order.
    data: Vec<f64>,
    fill_value: Option<f64>,
}

impl FixtureBuilder {
    /// A daily forecast-style field with `value = t + lat_index`, constant in
    /// longitude.
    fn new(nt: usize) -> Self {
        let lats = vec![-20.0, 0.0, 10.0, 20.0, 40.0];
        let lons = vec![50.0, 70.0, 90.0];
        let mut data = Vec::with_capacity(nt * lats.len() * lons.len());
        for t in 0..nt {
            for y in 0..lats.len() {
                for _ in 0..lons.len() {
                    data.push((t + y) as f64);
                }
            }
        }
        Self {
            var: "tot_precip".to_string(),
            time_dim: "t".to_string(),
            time_units: "days since 2024-06-13".to_string(),
            calendar: Some("gregorian".to_string()),
            times: (0..nt).map(|t| t as f64).collect(),
            lats,
            lons,
            surface: false,
            data,
            fill_value: None,
        }
    }

    fn with_var(mut self, var: &str) -> Self {
        self.var = var.to_string();
        self
    }

    fn with_time_dim(mut self, name: &str) -> Self {
        self.time_dim = name.to_string();
        self
    }

    fn with_time_units(mut self, units: &str) -> Self {
        self.time_units = units.to_string();
        self
    }

    fn with_times(mut self, times: Vec<f64>) -> Self {
        assert_eq!(times.len(), self.times.len());
        self.times = times;
        self
    }

    fn with_calendar(mut self, calendar: &str) -> Self {
        self.calendar = Some(calendar.to_string());
        self
    }

    fn with_surface(mut self) -> Self {
        self.surface = true;
        self
    }

    fn with_fill_value(mut self, fv: f64) -> Self {
        self.fill_value = Some(fv);
        self
    }

    /// Overwrite one `[t, lat, lon]` cell.
    fn with_cell(mut self, t: usize, y: usize, x: usize, value: f64) -> Self {
        let idx = (t * self.lats.len() + y) * self.lons.len() + x;
        self.data[idx] = value;
        self
    }

    /// Write the fixture to `dir/name` and return the path.
    fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        file.add_dimension(&self.time_dim, self.times.len())
            .expect("add dim time");
        if self.surface {
            file.add_dimension("surface", 1).expect("add dim surface");
        }
        file.add_dimension("latitude", self.lats.len())
            .expect("add dim lat");
        file.add_dimension("longitude", self.lons.len())
            .expect("add dim lon");

        {
            let mut var = file
                .add_variable::<f64>("latitude", &["latitude"])
                .expect("add var lat");
            var.put_values(&self.lats, ..).expect("put lat values");
        }
        {
            let mut var = file
                .add_variable::<f64>("longitude", &["longitude"])
                .expect("add var lon");
            var.put_values(&self.lons, ..).expect("put lon values");
        }
        {
            let mut var = file
                .add_variable::<f64>(&self.time_dim, &[self.time_dim.as_str()])
                .expect("add var time");
            var.put_attribute("units", self.time_units.as_str())
                .expect("add time units");
            if let Some(calendar) = &self.calendar {
                var.put_attribute("calendar", calendar.as_str())
                    .expect("add time calendar");
            }
            var.put_values(&self.times, ..).expect("put time values");
        }
        {
            let dims: Vec<&str> = if self.surface {
                vec![self.time_dim.as_str(), "surface", "latitude", "longitude"]
            } else {
                vec![self.time_dim.as_str(), "latitude", "longitude"]
            };
            let mut var = file
                .add_variable::<f64>(&self.var, &dims)
                .expect("add data var");
            if let Some(fv) = self.fill_value {
                var.put_attribute("_FillValue", fv)
                    .expect("add _FillValue");
            }
            var.put_values(&self.data, ..).expect("put data values");
        }

        path
    }
}

fn config() -> ReaderConfig {
    ReaderConfig::default().with_retry(RetryPolicy::none())
}

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

// ---------------------------------------------------------------------------
// Field reduction
// ---------------------------------------------------------------------------

#[test]
fn field_is_boxed_and_zonally_averaged() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(4).write(dir.path(), "fc.nc");

    let series = read_field(&path, "tot_precip", &config()).unwrap();
    // lats 0, 10, 20 fall in -12.5..30.5
    assert_eq!(series.lats(), &[0.0, 10.0, 20.0]);
    assert_eq!(series.times()[0], d(6, 13));
    assert_eq!(series.len(), 4);
    assert_relative_eq!(series.values()[[2, 0]], 3.0);
    assert_relative_eq!(series.values()[[3, 2]], 6.0);
}

#[test]
fn singleton_surface_axis_is_squeezed() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(3).with_surface().write(dir.path(), "fc.nc");
    let series = read_field(&path, "tot_precip", &config()).unwrap();
    assert_eq!(series.values().dim(), (3, 3));
}

#[test]
fn fill_values_are_skipped_in_zonal_mean() {
    let dir = tempdir().unwrap();
    // lon 50 is outside the box; lons 70 and 90 remain
    let path = FixtureBuilder::new(2)
        .with_fill_value(-9999.0)
        .with_cell(0, 1, 1, -9999.0)
        .with_cell(0, 1, 2, 4.0)
        .write(dir.path(), "fc.nc");
    let series = read_field(&path, "tot_precip", &config()).unwrap();
    assert_relative_eq!(series.values()[[0, 0]], 4.0);
}

#[test]
fn all_fill_cell_stays_undefined() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(2)
        .with_fill_value(-9999.0)
        .with_cell(1, 2, 1, -9999.0)
        .with_cell(1, 2, 2, -9999.0)
        .write(dir.path(), "fc.nc");
    let series = read_field(&path, "tot_precip", &config()).unwrap();
    assert!(series.values()[[1, 1]].is_nan());
}

#[test]
fn olr_box_keeps_wider_latitudes() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(2)
        .with_var("olr")
        .with_time_dim("time")
        .write(dir.path(), "olr.nc");
    let series = read_field(&path, "olr", &config().with_region(RegionBox::OLR)).unwrap();
    assert_eq!(series.lats(), &[-20.0, 0.0, 10.0, 20.0, 40.0]);
}

#[test]
fn hourly_time_axis_resolves_to_days() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(3)
        .with_time_units("hours since 2024-06-13 00:00:00")
        .with_times(vec![0.0, 24.0, 48.0])
        .write(dir.path(), "fc.nc");
    let series = read_field(&path, "tot_precip", &config()).unwrap();
    assert_eq!(series.times(), &[d(6, 13), d(6, 14), d(6, 15)]);
}

#[test]
fn noleap_calendar_is_rejected() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(2)
        .with_calendar("noleap")
        .write(dir.path(), "fc.nc");
    let err = read_field(&path, "tot_precip", &config()).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedCalendar { .. }));
}

#[test]
fn missing_file_and_variable() {
    let dir = tempdir().unwrap();
    let err = read_field(&dir.path().join("nope.nc"), "tot_precip", &config()).unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));

    let path = FixtureBuilder::new(2).write(dir.path(), "fc.nc");
    let err = read_field(&path, "olr", &config()).unwrap_err();
    assert!(matches!(err, IoError::MissingVariable { .. }));
}

#[test]
fn unreadable_file_exhausts_retries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("truncated.nc");
    std::fs::write(&path, b"not a netcdf file").unwrap();

    let config = ReaderConfig::default().with_retry(RetryPolicy::none().with_attempts(2));
    let err = read_field(&path, "tot_precip", &config).unwrap_err();
    match err {
        IoError::RetriesExhausted {
            path: failed,
            attempts,
            reason,
        } => {
            assert_eq!(failed, path);
            assert_eq!(attempts, 2);
            assert!(!reason.is_empty());
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }

    let err = read_score_std(&path, "miso_scores_std", &RetryPolicy::none()).unwrap_err();
    assert!(matches!(err, IoError::RetriesExhausted { attempts: 1, .. }));
}

#[test]
fn repeated_time_is_rejected() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(3)
        .with_times(vec![0.0, 1.0, 1.0])
        .write(dir.path(), "fc.nc");
    let err = read_field(&path, "tot_precip", &config()).unwrap_err();
    assert!(matches!(err, IoError::Grid(_)));
}

// ---------------------------------------------------------------------------
// Climatology
// ---------------------------------------------------------------------------

#[test]
fn annual_cycle_climatology_is_keyed_by_day_of_year() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(365)
        .with_var("olr")
        .with_time_dim("time")
        .with_time_units("days since 1900-01-01")
        .write(dir.path(), "clim.nc");
    let table = read_climatology(&path, "olr", &config()).unwrap();
    assert_eq!(table.n_days(), 365);
    assert!(!table.has_leap_day());
    // stamped from 2001-01-01: row 40 is doy 41 (Feb 10), value t + y
    let profile = table.profile(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()).unwrap();
    assert_relative_eq!(profile[0], 41.0);
}

#[test]
fn dayofyear_climatology_uses_labels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clim.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("dayofyear", 366).unwrap();
        file.add_dimension("lat", 1).unwrap();
        file.add_dimension("lon", 2).unwrap();
        // stored in reverse order
        let doys: Vec<f64> = (1..=366u16).rev().map(f64::from).collect();
        {
            let mut v = file.add_variable::<f64>("dayofyear", &["dayofyear"]).unwrap();
            v.put_values(&doys, ..).unwrap();
        }
        {
            let mut v = file.add_variable::<f64>("lat", &["lat"]).unwrap();
            v.put_values(&[5.0], ..).unwrap();
        }
        {
            let mut v = file.add_variable::<f64>("lon", &["lon"]).unwrap();
            v.put_values(&[70.0, 80.0], ..).unwrap();
        }
        {
            let mut v = file
                .add_variable::<f64>("tot_precip", &["dayofyear", "lat", "lon"])
                .unwrap();
            let data: Vec<f64> = doys.iter().flat_map(|&doy| [doy, doy + 2.0]).collect();
            v.put_values(&data, ..).unwrap();
        }
    }

    let table = read_climatology(&path, "tot_precip", &config()).unwrap();
    assert!(table.has_leap_day());
    let profile = table.profile(d(12, 31)).unwrap();
    assert_relative_eq!(profile[0], 367.0);
}

// ---------------------------------------------------------------------------
// EEOF operator
// ---------------------------------------------------------------------------

fn write_eofs(dir: &Path, with_lag_coord: bool) -> PathBuf {
    let path = dir.join("eofs.nc");
    let mut file = netcdf::create(&path).unwrap();
    // stored as (lat, embedding, mode) to exercise the permutation
    file.add_dimension("lat", 2).unwrap();
    file.add_dimension("embedding", 3).unwrap();
    file.add_dimension("mode", 2).unwrap();
    {
        let mut v = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        v.put_values(&[0.0, 10.0], ..).unwrap();
    }
    if with_lag_coord {
        let mut v = file.add_variable::<f64>("embedding", &["embedding"]).unwrap();
        v.put_values(&[0.0, 2.0, 4.0], ..).unwrap();
    }
    {
        let mut v = file
            .add_variable::<f64>("miso_eeofs", &["lat", "embedding", "mode"])
            .unwrap();
        let mut data = Vec::new();
        for y in 0..2 {
            for k in 0..3 {
                for m in 0..2 {
                    data.push((100 * m + 10 * k + y) as f64);
                }
            }
        }
        v.put_values(&data, ..).unwrap();
    }
    path
}

#[test]
fn eigenvectors_are_permuted_to_mode_lag_lat() {
    let dir = tempdir().unwrap();
    let path = write_eofs(dir.path(), true);
    let eofs = read_eigenvectors(&path, "miso_eeofs", 1, &RetryPolicy::none()).unwrap();
    assert_eq!(eofs.n_modes(), 2);
    assert_eq!(eofs.lags(), &[0, 2, 4]);
    assert_eq!(eofs.lats(), &[0.0, 10.0]);
    assert_relative_eq!(eofs.data()[[1, 2, 1]], 121.0);
}

#[test]
fn eigenvector_lags_default_to_tau_multiples() {
    let dir = tempdir().unwrap();
    let path = write_eofs(dir.path(), false);
    let eofs = read_eigenvectors(&path, "miso_eeofs", 3, &RetryPolicy::none()).unwrap();
    assert_eq!(eofs.lags(), &[0, 3, 6]);
}

#[test]
fn score_std_reads_one_value_per_mode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("std.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("mode", 2).unwrap();
        let mut v = file.add_variable::<f64>("miso_scores_std", &["mode"]).unwrap();
        v.put_values(&[12.5, 11.0], ..).unwrap();
    }
    let std = read_score_std(&path, "miso_scores_std", &RetryPolicy::none()).unwrap();
    assert_eq!(std.std(), &[12.5, 11.0]);
}
