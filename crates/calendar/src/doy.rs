//! Day-of-year newtype for the Gregorian calendar.

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// Day-of-year in the Gregorian calendar (1..=366).
///
/// Day 366 only exists in leap years. Like the ordinal used by most
/// climate tooling, every day from March 1 onward is shifted by one in a
/// leap year relative to a common year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Doy(u16);

impl Doy {
    /// Creates a new `Doy` from a day-of-year value.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDoy`] if `doy` is not in 1..=366.
    pub fn new(doy: u16) -> Result<Self, CalendarError> {
        if !(1..=366).contains(&doy) {
            return Err(CalendarError::InvalidDoy { doy });
        }
        Ok(Self(doy))
    }

    /// Day-of-year of a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        // ordinal() is always 1..=366
        Self(date.ordinal() as u16)
    }

    /// Returns the inner day-of-year value (1..=366).
    pub fn get(self) -> u16 {
        self.0
    }

    /// Returns the 0-based index suitable for array indexing (0..=365).
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

/// Returns `true` if `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `year` (365 or 366).
pub fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_valid() {
        assert_eq!(Doy::new(1).unwrap().get(), 1);
        assert_eq!(Doy::new(366).unwrap().get(), 366);
    }

    #[test]
    fn new_invalid() {
        assert_eq!(
            Doy::new(0).unwrap_err(),
            CalendarError::InvalidDoy { doy: 0 }
        );
        assert_eq!(
            Doy::new(367).unwrap_err(),
            CalendarError::InvalidDoy { doy: 367 }
        );
    }

    #[test]
    fn of_common_year() {
        assert_eq!(Doy::of(date(2023, 1, 1)).get(), 1);
        assert_eq!(Doy::of(date(2023, 3, 1)).get(), 60);
        assert_eq!(Doy::of(date(2023, 12, 31)).get(), 365);
    }

    #[test]
    fn of_leap_year() {
        assert_eq!(Doy::of(date(2024, 2, 29)).get(), 60);
        assert_eq!(Doy::of(date(2024, 3, 1)).get(), 61);
        assert_eq!(Doy::of(date(2024, 12, 31)).get(), 366);
    }

    #[test]
    fn index_is_zero_based() {
        assert_eq!(Doy::new(1).unwrap().index(), 0);
        assert_eq!(Doy::new(366).unwrap().index(), 365);
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2001));
        assert_eq!(days_in_year(2000), 366);
        assert_eq!(days_in_year(2001), 365);
    }

    #[test]
    fn ord_trait() {
        assert!(Doy::new(1).unwrap() < Doy::new(366).unwrap());
    }
}
