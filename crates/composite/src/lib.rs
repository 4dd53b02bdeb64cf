//! # miso-composite
//!
//! Collects per-(initialization, member) index series into one composite,
//! computes date-aligned ensemble means and summarizes the mean phase-space
//! trajectory for rendering.
//!
//! ```text
//! (init, member) ──► [MISO1, MISO2] ──► Composite ──┬─► collection(mode) ──► NamedCollection
//!                                                   ├─► ensemble_mean(mode) ──► IndexSeries
//!                                                   └─► summarize() ──► TrajectorySummary (JSON)
//! ```

mod collection;
mod composite;
mod error;
mod key;
mod output;

pub use collection::NamedCollection;
pub use composite::Composite;
pub use error::CompositeError;
pub use key::MemberKey;
pub use output::{TrajectoryPoint, TrajectorySummary, summarize, to_json};
