//! Geographic boxes used to subset gridded fields.

use crate::error::IoError;

/// An inclusive latitude/longitude box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBox {
    /// Indian-monsoon precipitation box used by the MISO patterns.
    pub const PRECIP: Self = Self {
        lat_min: -12.5,
        lat_max: 30.5,
        lon_min: 60.5,
        lon_max: 95.5,
    };

    /// Wider box for the OLR diagnostic.
    pub const OLR: Self = Self {
        lat_min: -30.5,
        lat_max: 40.5,
        lon_min: 30.5,
        lon_max: 180.5,
    };

    pub fn contains_lat(&self, lat: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat)
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        (self.lon_min..=self.lon_max).contains(&lon)
    }

    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every non-finite or inverted
    /// bound.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut problems = Vec::new();
        for (name, v) in [
            ("lat_min", self.lat_min),
            ("lat_max", self.lat_max),
            ("lon_min", self.lon_min),
            ("lon_max", self.lon_max),
        ] {
            if !v.is_finite() {
                problems.push(format!("{name} must be finite, got {v}"));
            }
        }
        if self.lat_min > self.lat_max {
            problems.push(format!(
                "lat_min {} exceeds lat_max {}",
                self.lat_min, self.lat_max
            ));
        }
        if self.lon_min > self.lon_max {
            problems.push(format!(
                "lon_min {} exceeds lon_max {}",
                self.lon_min, self.lon_max
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }
}

impl Default for RegionBox {
    fn default() -> Self {
        Self::PRECIP
    }
}
