//! # miso-calendar
//!
//! Gregorian date arithmetic for the forecast-to-index pipeline.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["YYYYMMDD"] -->|"parse_yyyymmdd()"| B["NaiveDate"]
//!     B -->|"latest_thursday()"| C["anchor"]
//!     C -->|"ForecastSchedule::new()"| D["initializations + windows"]
//!     B -->|"Doy::of()"| E["Doy (1..=366)"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use miso_calendar::{ForecastSchedule, latest_thursday, parse_yyyymmdd};
//!
//! let date = parse_yyyymmdd("20240615").unwrap();
//! let anchor = latest_thursday(date);
//! let schedule = ForecastSchedule::new(anchor, 4, 32).unwrap();
//! assert_eq!(schedule.ic_range_tag(), "20240609-20240612");
//! assert_eq!(schedule.forecast_tag(), "20240613");
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `doy` | Day-of-year newtype and leap-year helpers |
//! | `anchor` | Date-string parsing and forecast anchor resolution |
//! | `schedule` | Initialization dates, valid-time windows and naming tags |
//! | `sequence` | Daily date sequences and checked offsets |
//! | `error` | Error types |

mod anchor;
mod doy;
mod error;
mod schedule;
mod sequence;

pub use anchor::{latest_thursday, parse_yyyymmdd, resolve_anchor};
pub use doy::{Doy, days_in_year, is_leap_year};
pub use error::CalendarError;
pub use schedule::{ForecastSchedule, date_tag, init_tag};
pub use sequence::{daily_sequence, offset_date};
