//! Geographic coordinates with an explicit precision

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a coordinate would be invalid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinate {
    /// Precision must be finite and strictly positive
    Precision(f64),
    /// Latitude must be finite and within [-90, 90]
    Latitude(f64),
    /// Longitude must be finite and within [-180, 180]
    Longitude(f64),
}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidCoordinate::Precision(p) => write!(f, "precision {} is not positive", p),
            InvalidCoordinate::Latitude(v) => write!(f, "latitude {} is outside [-90, 90]", v),
            InvalidCoordinate::Longitude(v) => write!(f, "longitude {} is outside [-180, 180]", v),
        }
    }
}

impl std::error::Error for InvalidCoordinate {}

/// A decimal latitude/longitude pair with its positional precision (degrees)
///
/// A `Coordinate` can only be built through [`Coordinate::new`], so the
/// precision of every instance is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
    precision: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
    precision: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon, raw.precision)
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting non-positive precision and out-of-range
    /// latitude or longitude
    ///
    /// # Examples
    ///
    /// ```
    /// use infobox_domain::Coordinate;
    ///
    /// assert!(Coordinate::new(40.4, -79.9, 0.1).is_ok());
    /// assert!(Coordinate::new(40.4, -79.9, 0.0).is_err());
    /// ```
    pub fn new(lat: f64, lon: f64, precision: f64) -> Result<Self, InvalidCoordinate> {
        if !precision.is_finite() || precision <= 0.0 {
            return Err(InvalidCoordinate::Precision(precision));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate::Longitude(lon));
        }
        Ok(Self { lat, lon, precision })
    }

    /// Latitude in decimal degrees (south is negative)
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees (west is negative)
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Precision in degrees
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Number of decimal places the precision resolves to, capped at 5
    pub fn decimal_places(&self) -> usize {
        // log10 of 0.1 and friends is not always exact
        let places = (-self.precision.log10() - 1e-9).ceil();
        if places <= 0.0 {
            0
        } else {
            (places as usize).min(5)
        }
    }

    /// Render as a `lat|lon` decimal pair at the precision's resolution
    ///
    /// The output always contains a decimal point, so it can be fed back into
    /// the two-parameter decimal coordinate form.
    pub fn to_decimal_params(&self) -> [String; 2] {
        let places = self.decimal_places();
        [render_decimal(self.lat, places), render_decimal(self.lon, places)]
    }
}

fn render_decimal(value: f64, places: usize) -> String {
    if places == 0 {
        format!("{:.0}.", value)
    } else {
        format!("{:.*}", places, value)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [lat, lon] = self.to_decimal_params();
        write!(f, "{}, {} (±{})", lat, lon, self.precision)
    }
}
