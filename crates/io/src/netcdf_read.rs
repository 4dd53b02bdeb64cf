//! Low-level NetCDF extraction helpers.

use std::path::Path;
use std::thread;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use ndarray::{ArrayD, Axis, IxDyn};
use netcdf::AttributeValue;
use tracing::{debug, warn};

use crate::error::IoError;
use crate::retry::RetryPolicy;

pub(crate) const TIME_ALIASES: &[&str] = &["t", "time"];
pub(crate) const LAT_ALIASES: &[&str] = &["latitude", "lat"];
pub(crate) const LON_ALIASES: &[&str] = &["longitude", "lon"];

/// Open a NetCDF file at `path`, retrying library failures under `retry`.
///
/// A missing path fails immediately with [`IoError::FileNotFound`].
pub(crate) fn open_file(path: &Path, retry: &RetryPolicy) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let attempts = retry.attempts().max(1);
    let mut last = String::new();
    for attempt in 1..=attempts {
        match netcdf::open(path) {
            Ok(file) => return Ok(file),
            Err(e) => {
                last = e.to_string();
                if attempt < attempts {
                    warn!(
                        path = %path.display(),
                        attempt,
                        attempts,
                        error = %last,
                        "netcdf open failed, retrying"
                    );
                    thread::sleep(retry.backoff());
                }
            }
        }
    }
    Err(IoError::RetriesExhausted {
        path: path.to_path_buf(),
        attempts,
        reason: last,
    })
}

/// A variable's values with its dimension names, undefined where the file
/// marks a fill value.
#[derive(Debug)]
pub(crate) struct LabeledArray {
    pub(crate) name: String,
    pub(crate) dims: Vec<String>,
    pub(crate) data: ArrayD<f64>,
}

impl LabeledArray {
    pub(crate) fn find_dim(&self, aliases: &[&str]) -> Option<usize> {
        self.dims.iter().position(|d| aliases.contains(&d.as_str()))
    }

    /// Reorders the array to the requested axes and drops every other
    /// dimension, which must have length one.
    ///
    /// Returns the array together with the file's name for each requested
    /// axis.
    pub(crate) fn conform(
        self,
        axes: &[(&'static str, &[&str])],
    ) -> Result<(ArrayD<f64>, Vec<String>), IoError> {
        let mut positions = Vec::with_capacity(axes.len());
        for &(canonical, aliases) in axes {
            let pos = self.find_dim(aliases).ok_or_else(|| IoError::MissingDimension {
                name: canonical,
                variable: self.name.clone(),
            })?;
            positions.push(pos);
        }

        let extra: Vec<usize> = (0..self.dims.len())
            .filter(|i| !positions.contains(i))
            .collect();
        for &i in &extra {
            let len = self.data.len_of(Axis(i));
            if len != 1 {
                return Err(IoError::DimensionMismatch {
                    name: self.dims[i].clone(),
                    expected: 1,
                    got: len,
                });
            }
        }

        let names = positions.iter().map(|&p| self.dims[p].clone()).collect();
        let mut data = self.data;
        for &i in extra.iter().rev() {
            data = data.index_axis_move(Axis(i), 0);
        }
        let squeezed: Vec<usize> = positions
            .iter()
            .map(|&p| p - extra.iter().filter(|&&e| e < p).count())
            .collect();
        let data = data
            .permuted_axes(IxDyn(&squeezed))
            .as_standard_layout()
            .into_owned();
        Ok((data, names))
    }
}

fn attribute_f64(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        _ => None,
    }
}

/// Read a variable as `f64`, replacing `_FillValue` and `missing_value`
/// entries with NaN.
pub(crate) fn read_variable(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<LabeledArray, IoError> {
    let var = file.variable(name).ok_or_else(|| IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;

    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut values = var.get_values::<f64, _>(..)?;

    let sentinels: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|attr| attribute_f64(&var, attr))
        .collect();
    if !sentinels.is_empty() {
        let mut masked = 0usize;
        for v in values.iter_mut() {
            if sentinels.contains(&*v) {
                *v = f64::NAN;
                masked += 1;
            }
        }
        debug!(variable = name, masked, "fill values masked");
    }

    let n = values.len();
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
        IoError::DimensionMismatch {
            name: format!("{name} values"),
            expected: shape.iter().product(),
            got: n,
        }
    })?;

    Ok(LabeledArray {
        name: name.to_string(),
        dims,
        data,
    })
}

/// Read a 1-D `f64` variable, trying each alias in order.
///
/// Returns the data from the first alias that matches. If none match,
/// returns [`IoError::MissingVariable`] with the first alias as the name.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    for &alias in aliases {
        if let Some(var) = file.variable(alias) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }

    let name = aliases.first().copied().unwrap_or("unknown");
    Err(IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}

/// Scale of a CF time unit in seconds.
fn unit_seconds(unit: &str) -> Option<f64> {
    match unit {
        "days" | "day" | "d" => Some(86_400.0),
        "hours" | "hour" | "h" => Some(3_600.0),
        "minutes" | "minute" | "min" => Some(60.0),
        "seconds" | "second" | "s" => Some(1.0),
        _ => None,
    }
}

/// Parse CF units such as `"days since 2000-01-01"` or
/// `"hours since 2024-06-09 00:00:00"` into a unit scale and an epoch.
pub(crate) fn parse_time_units(units: &str) -> Result<(f64, NaiveDateTime), IoError> {
    let invalid = || IoError::InvalidTime {
        reason: format!("unexpected time units format: '{units}'"),
    };

    let parts: Vec<&str> = units.trim().splitn(3, ' ').collect();
    if parts.len() < 3 || parts[1] != "since" {
        return Err(invalid());
    }
    let scale = unit_seconds(parts[0]).ok_or_else(invalid)?;

    let mut tokens = parts[2].trim().splitn(2, ['T', ' ']);
    let date_str = tokens.next().unwrap_or_default();
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| IoError::InvalidTime {
        reason: format!("failed to parse base date '{date_str}': {e}"),
    })?;
    let time = tokens
        .next()
        .map(|t| t.trim_end_matches('Z').trim())
        .and_then(|t| {
            NaiveTime::parse_from_str(t, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()
        })
        .unwrap_or(NaiveTime::MIN);

    Ok((scale, date.and_time(time)))
}

fn string_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Read the time coordinate `name` and convert it to calendar dates.
///
/// Only Gregorian-compatible calendars are accepted. Offsets are rounded to
/// the nearest second before the date is taken.
pub(crate) fn read_time_axis(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<NaiveDate>, IoError> {
    let var = file.variable(name).ok_or_else(|| IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;

    let units = string_attribute(&var, "units").ok_or_else(|| IoError::InvalidTime {
        reason: format!("time variable '{name}' has no string 'units' attribute"),
    })?;
    if let Some(calendar) = string_attribute(&var, "calendar") {
        let lower = calendar.to_ascii_lowercase();
        if !matches!(lower.as_str(), "standard" | "gregorian" | "proleptic_gregorian") {
            return Err(IoError::UnsupportedCalendar { calendar });
        }
    }

    let (scale, epoch) = parse_time_units(&units)?;
    let offsets = var.get_values::<f64, _>(..)?;
    offsets_to_dates(epoch, scale, &offsets)
}

pub(crate) fn offsets_to_dates(
    epoch: NaiveDateTime,
    scale: f64,
    offsets: &[f64],
) -> Result<Vec<NaiveDate>, IoError> {
    offsets
        .iter()
        .map(|&offset| {
            if !offset.is_finite() {
                return Err(IoError::InvalidTime {
                    reason: format!("undefined time offset {offset}"),
                });
            }
            let seconds = (offset * scale).round() as i64;
            epoch
                .checked_add_signed(TimeDelta::seconds(seconds))
                .map(|dt| dt.date())
                .ok_or_else(|| IoError::InvalidTime {
                    reason: format!("date overflow adding {seconds} s to {epoch}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn epoch(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn parses_days_since() {
        let (scale, base) = parse_time_units("days since 1970-01-01").unwrap();
        assert_eq!(scale, 86_400.0);
        assert_eq!(base, epoch(1970, 1, 1));
    }

    #[test]
    fn parses_hours_since_with_clock() {
        let (scale, base) = parse_time_units("hours since 2024-06-09 12:00:00").unwrap();
        assert_eq!(scale, 3_600.0);
        assert_eq!(base.date(), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert_eq!(base.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn parses_iso_separator() {
        let (_, base) = parse_time_units("seconds since 2000-01-01T00:00:00Z").unwrap();
        assert_eq!(base, epoch(2000, 1, 1));
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(parse_time_units("fortnights since 2000-01-01").is_err());
        assert!(parse_time_units("days after 2000-01-01").is_err());
    }

    #[test]
    fn hour_offsets_map_to_days() {
        let dates = offsets_to_dates(epoch(2024, 6, 9), 3_600.0, &[0.0, 24.0, 60.0]).unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        assert_eq!(dates, vec![d(9), d(10), d(11)]);
    }

    #[test]
    fn leap_day_is_a_real_date() {
        let dates = offsets_to_dates(epoch(2024, 1, 1), 86_400.0, &[59.0]).unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn nan_offset_rejected() {
        assert!(offsets_to_dates(epoch(2024, 1, 1), 86_400.0, &[f64::NAN]).is_err());
    }

    #[test]
    fn conform_squeezes_and_permutes() {
        // (lon=2, surface=1, t=3)
        let data = Array::from_shape_fn(IxDyn(&[2, 1, 3]), |ix| (10 * ix[0] + ix[2]) as f64);
        let labeled = LabeledArray {
            name: "tot_precip".to_string(),
            dims: vec!["longitude".into(), "surface".into(), "t".into()],
            data,
        };
        let (out, names) = labeled
            .conform(&[("time", TIME_ALIASES), ("lon", LON_ALIASES)])
            .unwrap();
        assert_eq!(names, vec!["t".to_string(), "longitude".to_string()]);
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out[IxDyn(&[2, 1])], 12.0);
    }

    #[test]
    fn conform_rejects_wide_extra_dim() {
        let labeled = LabeledArray {
            name: "x".to_string(),
            dims: vec!["time".into(), "level".into()],
            data: ArrayD::zeros(IxDyn(&[2, 3])),
        };
        assert!(matches!(
            labeled.conform(&[("time", TIME_ALIASES)]),
            Err(IoError::DimensionMismatch { got: 3, .. })
        ));
    }

    #[test]
    fn conform_reports_missing_dim() {
        let labeled = LabeledArray {
            name: "x".to_string(),
            dims: vec!["time".into()],
            data: ArrayD::zeros(IxDyn(&[2])),
        };
        assert!(matches!(
            labeled.conform(&[("lat", LAT_ALIASES)]),
            Err(IoError::MissingDimension { name: "lat", .. })
        ));
    }
}
