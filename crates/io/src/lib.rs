//! # miso-io
//!
//! Reads forecast fields, lagged analyses, climatologies and the EEOF
//! operator from NetCDF, writes per-mode index collections back to NetCDF,
//! and knows where each of those files lives.
//!
//! Gridded fields are reduced on read: the configured latitude/longitude
//! box is selected and longitudes are averaged skipping undefined values,
//! producing a `(time, lat)` [`miso_grid::GriddedSeries`].

mod error;
mod layout;
mod netcdf_read;
mod reader;
mod region;
mod retry;
mod writer;

pub use error::IoError;
pub use layout::{FieldKind, analysis_path, forecast_path, output_path};
pub use reader::{ReaderConfig, read_climatology, read_eigenvectors, read_field, read_score_std};
pub use region::RegionBox;
pub use retry::RetryPolicy;
pub use writer::write_collection;
