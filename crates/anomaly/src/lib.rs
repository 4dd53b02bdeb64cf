//! # miso-anomaly
//!
//! Day-of-year climatology tables and the anomaly constructor.
//!
//! ```text
//! daily record ──from_daily_record()──► ClimatologyTable
//!                                           │ aligned_to(LatAlignment)   (once)
//!                                           ▼
//! GriddedSeries ──compute_anomaly()──► AnomalySeries
//! ```
//!
//! A table holds exactly one profile per day-of-year: 365 entries for a
//! common-year reference, 366 when the reference includes a leap day. A
//! series date whose day-of-year is absent from the table is a lookup
//! error, never a silent wrap.

mod anomaly;
mod climatology;
mod error;

pub use anomaly::{AnomalySeries, compute_anomaly, compute_anomaly_aligned};
pub use climatology::{ClimatologyTable, reference_start};
pub use error::AnomalyError;
