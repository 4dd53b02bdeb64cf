//! Where run inputs and outputs live on disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use miso_calendar::{CalendarError, ForecastSchedule, date_tag, init_tag, offset_date};

/// Days between an initialization and the end date in its file name.
const FORECAST_NAME_SPAN: i64 = 18;
/// First and last day of the lagged analysis file, relative to the anchor.
const ANALYSIS_SPAN: (i64, i64) = (-16, -1);

/// Which forecast field a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Precip,
    Olr,
}

impl FieldKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Precip => "",
            Self::Olr => "_OLR",
        }
    }
}

/// Forecast file for one initialization and member:
/// `<root>/<YYYYMMDDT0000Z>/<member>/1/concatenated_<init>_<init+18>_<member>[_OLR].nc`.
///
/// # Errors
///
/// Returns [`CalendarError::DateOverflow`] if the name's end date is out of
/// range.
pub fn forecast_path(
    root: &Path,
    init: NaiveDate,
    member: &str,
    kind: FieldKind,
) -> Result<PathBuf, CalendarError> {
    let end = offset_date(init, FORECAST_NAME_SPAN)?;
    let name = format!(
        "concatenated_{}_{}_{member}{}.nc",
        date_tag(init),
        date_tag(end),
        kind.suffix()
    );
    Ok(root
        .join(init_tag(init))
        .join(member)
        .join("1")
        .join(name))
}

/// Lagged precipitation analysis covering the 16 days before `anchor`.
///
/// # Errors
///
/// Returns [`CalendarError::DateOverflow`] near the ends of the date range.
pub fn analysis_path(dir: &Path, anchor: NaiveDate) -> Result<PathBuf, CalendarError> {
    let start = offset_date(anchor, ANALYSIS_SPAN.0)?;
    let end = offset_date(anchor, ANALYSIS_SPAN.1)?;
    Ok(dir.join(format!(
        "prate_daily_avg_{}_to_{}_regrid.nc",
        date_tag(start),
        date_tag(end)
    )))
}

/// Output file for one mode, e.g. `MISO1_CNCUM_IC_20240609-20240612_FC_20240613.nc`.
pub fn output_path(
    dir: &Path,
    mode_name: &str,
    model_tag: &str,
    schedule: &ForecastSchedule,
) -> PathBuf {
    dir.join(format!(
        "{mode_name}_{model_tag}_IC_{}_FC_{}.nc",
        schedule.ic_range_tag(),
        schedule.forecast_tag()
    ))
}
