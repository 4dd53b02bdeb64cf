//! JSON summary of the ensemble-mean phase-space trajectory.

use miso_calendar::{date_tag, init_tag};
use serde::Serialize;

use crate::composite::Composite;
use crate::error::CompositeError;

/// Top-level summary consumed by the phase-diagram renderer.
#[derive(Debug, Serialize)]
pub struct TrajectorySummary {
    /// Forecast anchor, `YYYYMMDD`.
    pub forecast: String,
    /// Initialization labels, `YYYYMMDDT0000Z`.
    pub initializations: Vec<String>,
    /// Member names.
    pub members: Vec<String>,
    pub n_pairs: usize,
    /// Ensemble-mean trajectory, one point per date.
    pub trajectory: Vec<TrajectoryPoint>,
}

/// One day of the ensemble-mean trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryPoint {
    pub date: String,
    pub miso1: f64,
    pub miso2: f64,
    /// `sqrt(miso1² + miso2²)`.
    pub amplitude: f64,
    /// Members contributing to this date.
    pub n_members: usize,
}

/// Builds the trajectory summary from the first two modes of `composite`.
///
/// Dates missing from either mean are left out.
///
/// # Errors
///
/// Returns [`CompositeError::UnknownMode`] if the composite has fewer than
/// two modes and [`CompositeError::Empty`] if it has no members.
pub fn summarize(
    composite: &Composite,
    forecast: chrono::NaiveDate,
) -> Result<TrajectorySummary, CompositeError> {
    let miso1 = composite.ensemble_mean(0)?;
    let miso2 = composite.ensemble_mean(1)?;
    let coverage = composite.coverage(0)?;

    let trajectory = miso1
        .iter()
        .zip(coverage)
        .filter_map(|((date, m1), (_, n_members))| {
            miso2.get(date).map(|m2| TrajectoryPoint {
                date: date_tag(date),
                miso1: m1,
                miso2: m2,
                amplitude: m1.hypot(m2),
                n_members,
            })
        })
        .collect();

    let mut initializations: Vec<String> = composite.keys().map(|k| init_tag(k.init())).collect();
    initializations.dedup();
    let mut members: Vec<String> = composite.keys().map(|k| k.member().to_string()).collect();
    members.sort();
    members.dedup();

    Ok(TrajectorySummary {
        forecast: date_tag(forecast),
        initializations,
        members,
        n_pairs: composite.len(),
        trajectory,
    })
}

/// Serialize a trajectory summary to a JSON string.
pub fn to_json(summary: &TrajectorySummary) -> Result<String, CompositeError> {
    serde_json::to_string_pretty(summary).map_err(|e| CompositeError::Serialization {
        reason: e.to_string(),
    })
}
