//! # miso-eeof
//!
//! Applies a precomputed extended-EOF operator to an anomaly series.
//!
//! ```text
//! GriddedSeries ──build_embedding(tau, embedding)──► EmbeddedMatrix (lag × time × lat)
//!                                                        │
//! EigenvectorSet (mode × lag × lat) ──────────────────► project() ◄── ScoreNormalizer
//!                                                        │
//!                                                        ▼
//!                                              IndexSeries per mode (MISO1, MISO2, …)
//! ```
//!
//! # Quick start
//!
//! ```
//! use chrono::NaiveDate;
//! use miso_eeof::{EigenvectorSet, ScoreNormalizer, build_embedding, project};
//! use miso_grid::GriddedSeries;
//! use ndarray::{Array2, Array3};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let times: Vec<NaiveDate> = start.iter_days().take(10).collect();
//! let series = GriddedSeries::new(times, vec![0.0, 1.0], Array2::ones((10, 2))).unwrap();
//!
//! let embedded = build_embedding(&series, 1, 3).unwrap();
//! assert_eq!(embedded.n_times(), 8);
//!
//! let eofs = EigenvectorSet::new(vec![0, 1, 2], vec![0.0, 1.0], Array3::ones((2, 3, 2))).unwrap();
//! let std = ScoreNormalizer::new(vec![2.0, 3.0]).unwrap();
//! let scores = project(&embedded, &eofs, &std).unwrap();
//! assert_eq!(scores[0].name(), "MISO1");
//! assert_eq!(scores[0].values()[0], 3.0);
//! ```

mod embedding;
mod error;
mod index;
mod operator;
mod project;

pub use embedding::{EmbeddedMatrix, EmbeddingConfig, build_embedding};
pub use error::EeofError;
pub use index::{IndexSeries, mode_name};
pub use operator::{EigenvectorSet, ScoreNormalizer};
pub use project::{project, raw_scores};
