//! Forecast initialization schedule and naming tags.

use chrono::NaiveDate;

use crate::error::CalendarError;
use crate::sequence::{daily_sequence, offset_date};

/// Formats a date as `YYYYMMDD`.
pub fn date_tag(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats an initialization date as `YYYYMMDDT0000Z`.
pub fn init_tag(date: NaiveDate) -> String {
    date.format("%Y%m%dT0000Z").to_string()
}

/// The set of initializations feeding one forecast anchor.
///
/// Initializations are the `n` days immediately preceding the anchor, in
/// ascending order. Every member of every initialization is evaluated over
/// the same valid-date window starting on the anchor itself, so older
/// initializations contribute longer lead times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastSchedule {
    anchor: NaiveDate,
    initializations: Vec<NaiveDate>,
    forecast_days: usize,
}

impl ForecastSchedule {
    /// Builds the schedule for `anchor` with `n_initializations` daily
    /// initializations and a `forecast_days`-long valid-date window.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidScheduleParameter`] if either count
    /// is zero, or [`CalendarError::DateOverflow`] near the ends of the
    /// representable date range.
    pub fn new(
        anchor: NaiveDate,
        n_initializations: usize,
        forecast_days: usize,
    ) -> Result<Self, CalendarError> {
        if n_initializations == 0 {
            return Err(CalendarError::InvalidScheduleParameter {
                name: "n_initializations",
                value: n_initializations,
            });
        }
        if forecast_days == 0 {
            return Err(CalendarError::InvalidScheduleParameter {
                name: "forecast_days",
                value: forecast_days,
            });
        }
        let initializations = (1..=n_initializations as i64)
            .rev()
            .map(|back| offset_date(anchor, -back))
            .collect::<Result<Vec<_>, _>>()?;
        offset_date(anchor, forecast_days as i64 - 1)?;

        Ok(Self {
            anchor,
            initializations,
            forecast_days,
        })
    }

    /// The forecast anchor date.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Initialization dates in ascending order.
    pub fn initializations(&self) -> &[NaiveDate] {
        &self.initializations
    }

    /// Length of the valid-date window in days.
    pub fn forecast_days(&self) -> usize {
        self.forecast_days
    }

    /// Inclusive valid-date window `(anchor, anchor + forecast_days - 1)`.
    pub fn forecast_window(&self) -> (NaiveDate, NaiveDate) {
        // Range checked in new().
        let end = self.anchor + chrono::TimeDelta::days(self.forecast_days as i64 - 1);
        (self.anchor, end)
    }

    /// Every valid date of the forecast window.
    pub fn forecast_dates(&self) -> Vec<NaiveDate> {
        daily_sequence(self.anchor, self.forecast_days)
    }

    /// Inclusive window of `history_days` days ending the day before the
    /// anchor, or `None` when `history_days` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::DateOverflow`] if the start is out of range.
    pub fn history_window(
        &self,
        history_days: usize,
    ) -> Result<Option<(NaiveDate, NaiveDate)>, CalendarError> {
        if history_days == 0 {
            return Ok(None);
        }
        let start = offset_date(self.anchor, -(history_days as i64))?;
        let end = offset_date(self.anchor, -1)?;
        Ok(Some((start, end)))
    }

    /// Initialization range tag, e.g. `20240609-20240612`.
    pub fn ic_range_tag(&self) -> String {
        // new() guarantees at least one initialization.
        let first = self.initializations[0];
        let last = self.initializations[self.initializations.len() - 1];
        format!("{}-{}", date_tag(first), date_tag(last))
    }

    /// Forecast tag, e.g. `20240613`.
    pub fn forecast_tag(&self) -> String {
        date_tag(self.anchor)
    }
}
