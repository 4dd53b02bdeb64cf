//! NetCDF output of per-mode index collections.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use miso_composite::NamedCollection;
use tracing::{debug, info};

use crate::error::IoError;

const TIME_UNITS: &str = "days since 1970-01-01";

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Write `collection` to `path`, replacing any existing file.
///
/// All variables share one `time` dimension: the sorted union of their
/// dates, in days since 1970-01-01. A variable without a value on a date
/// holds NaN there.
///
/// # Errors
///
/// Returns [`IoError::Validation`] for an empty collection,
/// [`IoError::Replace`] if an existing file cannot be removed, and
/// [`IoError::Netcdf`] on write failures.
pub fn write_collection(path: &Path, collection: &NamedCollection) -> Result<(), IoError> {
    let axis = collection.time_axis();
    if collection.variables().is_empty() || axis.is_empty() {
        return Err(IoError::Validation {
            count: 1,
            details: format!("collection '{}' has no data to write", collection.name()),
        });
    }

    if path.exists() {
        fs::remove_file(path).map_err(|e| IoError::Replace {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "existing output removed");
    }

    let epoch = epoch();
    let offsets: Vec<f64> = axis
        .iter()
        .map(|d| (*d - epoch).num_days() as f64)
        .collect();

    let mut file = netcdf::create(path)?;
    file.add_dimension("time", axis.len())?;
    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", TIME_UNITS)?;
        var.put_attribute("calendar", "standard")?;
        var.put_values(&offsets, ..)?;
    }
    for (name, series) in collection.variables() {
        let mut var = file.add_variable::<f64>(name, &["time"])?;
        var.put_attribute("long_name", collection.name())?;
        var.put_values(&NamedCollection::values_on(series, &axis), ..)?;
    }

    info!(
        path = %path.display(),
        collection = collection.name(),
        n_variables = collection.variables().len(),
        n_times = axis.len(),
        "index collection written"
    );
    Ok(())
}
