//! # miso-grid
//!
//! Labeled time × latitude series and the latitude alignment step that
//! reconciles grids from different sources before any arithmetic.
//!
//! Alignment is computed once as a [`LatAlignment`] index map and then
//! applied to as many arrays as need it; downstream arithmetic asserts exact
//! latitude equality instead of re-snapping.

mod align;
mod cache;
mod error;
mod series;
mod validate;

pub use align::{AlignmentPolicy, LAT_TOLERANCE, LatAlignment, ensure_lats_match};
pub use cache::AlignmentCache;
pub use error::GridError;
pub use series::GriddedSeries;
pub use validate::{UndefinedSample, find_undefined, undefined_dates};
