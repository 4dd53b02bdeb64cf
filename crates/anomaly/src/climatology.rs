//! Day-of-year climatology tables.

use chrono::NaiveDate;
use miso_calendar::{Doy, daily_sequence, days_in_year};
use miso_grid::{GriddedSeries, LatAlignment};
use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

use crate::error::AnomalyError;

/// Start date used to stamp a single-year climatology stored on a plain
/// daily axis: a leap reference year for 366 samples, a common year for 365.
///
/// Returns `None` for any other length.
pub fn reference_start(n_days: usize) -> Option<NaiveDate> {
    [2001, 2000]
        .into_iter()
        .find(|&year| usize::from(days_in_year(year)) == n_days)
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}

/// Mean state per day-of-year on a latitude axis.
///
/// Holds exactly one profile for every day-of-year `1..=n_days`, with
/// `n_days` either 365 or 366.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyTable {
    lats: Vec<f64>,
    /// Shape `(n_days, lat)`; row `d` holds day-of-year `d + 1`.
    profiles: Array2<f64>,
}

impl ClimatologyTable {
    /// Builds a table from profiles labeled by day-of-year.
    ///
    /// `doys[i]` labels row `i` of `profiles`. Labels may come in any order
    /// but must cover `1..=n` exactly once, with `n` equal to 365 or 366.
    ///
    /// # Errors
    ///
    /// Returns [`AnomalyError::Calendar`] for a label outside `1..=366`,
    /// [`AnomalyError::InvalidTableLength`], [`AnomalyError::DuplicateEntry`]
    /// or [`AnomalyError::IncompleteTable`] when the labels do not form a
    /// complete calendar, and a grid error on shape mismatch.
    pub fn from_doy_profiles(
        doys: &[u16],
        lats: Vec<f64>,
        profiles: Array2<f64>,
    ) -> Result<Self, AnomalyError> {
        let n_days = doys.len();
        if n_days != 365 && n_days != 366 {
            return Err(AnomalyError::InvalidTableLength { n_days });
        }
        check_shape(&lats, &profiles, n_days)?;

        let mut order: Vec<Option<usize>> = vec![None; n_days];
        for (row, &label) in doys.iter().enumerate() {
            let doy = Doy::new(label)?;
            let slot = order
                .get_mut(doy.index())
                .ok_or_else(|| AnomalyError::IncompleteTable {
                    doy: first_missing(doys, n_days),
                })?;
            if slot.is_some() {
                return Err(AnomalyError::DuplicateEntry { doy: label });
            }
            *slot = Some(row);
        }
        let rows = order
            .iter()
            .enumerate()
            .map(|(i, r)| r.ok_or(AnomalyError::IncompleteTable { doy: i as u16 + 1 }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lats,
            profiles: profiles.select(Axis(0), &rows),
        })
    }

    /// Builds a table from a single-year annual cycle on a plain daily axis.
    ///
    /// The rows are stamped with consecutive dates from
    /// [`reference_start`] and keyed by their day-of-year, so 366 rows yield
    /// a leap-year table and 365 rows a common-year table.
    ///
    /// # Errors
    ///
    /// Returns [`AnomalyError::InvalidTableLength`] for any other length.
    pub fn from_annual_cycle(lats: Vec<f64>, values: Array2<f64>) -> Result<Self, AnomalyError> {
        let n_days = values.nrows();
        let start =
            reference_start(n_days).ok_or(AnomalyError::InvalidTableLength { n_days })?;
        let record = GriddedSeries::new(daily_sequence(start, n_days), lats, values)?;
        Self::from_daily_record(&record)
    }

    /// Builds a table by averaging a daily record by day-of-year.
    ///
    /// Undefined values are skipped in each mean; a day-of-year and latitude
    /// with no defined value yields an undefined entry. Day-of-year 366 is
    /// present only if the record contains December 31 of a leap year.
    ///
    /// # Errors
    ///
    /// Returns [`AnomalyError::IncompleteTable`] if the record does not
    /// cover every day-of-year up to its last one.
    pub fn from_daily_record(record: &GriddedSeries) -> Result<Self, AnomalyError> {
        let n_lat = record.n_lat();
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); 366];
        for (t, &date) in record.times().iter().enumerate() {
            buckets[Doy::of(date).index()].push(t);
        }
        let n_days = if buckets[365].is_empty() { 365 } else { 366 };
        if let Some(missing) = buckets[..n_days].iter().position(Vec::is_empty) {
            return Err(AnomalyError::IncompleteTable {
                doy: missing as u16 + 1,
            });
        }

        let values = record.values();
        let profiles = Array2::from_shape_fn((n_days, n_lat), |(d, y)| {
            miso_stats::finite_mean(buckets[d].iter().map(|&t| values[[t, y]])).unwrap_or(f64::NAN)
        });
        debug!(
            n_days,
            n_lat,
            n_samples = record.len(),
            "climatology built from daily record"
        );

        Ok(Self {
            lats: record.lats().to_vec(),
            profiles,
        })
    }

    /// Latitude axis.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Number of day-of-year entries (365 or 366).
    pub fn n_days(&self) -> usize {
        self.profiles.nrows()
    }

    /// Returns `true` if the table carries a day-of-year 366 entry.
    pub fn has_leap_day(&self) -> bool {
        self.n_days() == 366
    }

    /// Profile for `date`'s day-of-year.
    ///
    /// # Errors
    ///
    /// Returns [`AnomalyError::MissingDayOfYear`] when the table has no
    /// entry for that day, i.e. day 366 in a common-year table.
    pub fn profile(&self, date: NaiveDate) -> Result<ArrayView1<'_, f64>, AnomalyError> {
        let doy = Doy::of(date);
        if doy.index() >= self.n_days() {
            return Err(AnomalyError::MissingDayOfYear {
                doy: doy.get(),
                date,
                n_days: self.n_days(),
            });
        }
        Ok(self.profiles.row(doy.index()))
    }

    /// Returns a copy of the table reindexed onto `alignment`'s target grid.
    ///
    /// # Errors
    ///
    /// Returns a grid error if the table is not on the alignment's source
    /// grid.
    pub fn aligned_to(&self, alignment: &LatAlignment) -> Result<Self, AnomalyError> {
        Ok(Self {
            lats: alignment.target().to_vec(),
            profiles: alignment.apply(&self.profiles, Axis(1))?,
        })
    }
}

fn check_shape(lats: &[f64], profiles: &Array2<f64>, n_days: usize) -> Result<(), AnomalyError> {
    let (nd, ny) = profiles.dim();
    if nd != n_days {
        return Err(miso_grid::GridError::ShapeMismatch {
            name: "dayofyear",
            expected: n_days,
            got: nd,
        }
        .into());
    }
    if ny != lats.len() || lats.is_empty() {
        return Err(miso_grid::GridError::ShapeMismatch {
            name: "lat",
            expected: lats.len(),
            got: ny,
        }
        .into());
    }
    Ok(())
}

fn first_missing(doys: &[u16], n_days: usize) -> u16 {
    (1..=n_days as u16)
        .find(|d| !doys.contains(d))
        .unwrap_or(n_days as u16)
}
