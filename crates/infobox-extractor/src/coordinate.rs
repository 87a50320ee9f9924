//! Coordinate calculator: `{{coord|...}}` parameters to a decimal position

use crate::error::CoordinateError;
use infobox_domain::Coordinate;
use tracing::debug;

/// Finest precision ever claimed, in decimal places
const MAX_DECIMAL_PLACES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "N" => Some(Self::North),
            "S" => Some(Self::South),
            "E" => Some(Self::East),
            // "O" is "Ouest" in French-language markup
            "W" | "O" => Some(Self::West),
            _ => None,
        }
    }

    fn is_latitude(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    fn sign(self) -> f64 {
        match self {
            Self::South | Self::West => -1.0,
            Self::North | Self::East => 1.0,
        }
    }
}

/// Precision implied by the decimal digits written in `value`
///
/// No decimal point gives `1`; otherwise `10^-k` with `k` capped at five.
pub fn precision_for(value: &str) -> f64 {
    let digits = value
        .trim()
        .split_once('.')
        .map(|(_, fraction)| fraction.chars().take_while(char::is_ascii_digit).count())
        .unwrap_or(0);
    10f64.powi(-(digits.min(MAX_DECIMAL_PLACES) as i32))
}

/// Convert positional coordinate parameters to a [`Coordinate`]
///
/// Named parameters (`display=title`, `region:US-PA`) are ignored. Accepted
/// shapes, tried in order:
///
/// | shape | parameters | precision from |
/// |-------|------------|----------------|
/// | degrees/minutes/seconds | `d m s N|S d m s [E|W|O]` | seconds, `/ 3600` |
/// | degrees/minutes | `d m N|S d m [E|W|O]` | minutes, `/ 60` |
/// | degrees with hemisphere | `d N|S d [E|W|O]` | latitude |
/// | decimal pair | `lat lon` (both with a `.`) | latitude |
///
/// A missing or unrecognized longitude hemisphere reads as east.
///
/// # Examples
///
/// ```
/// use infobox_extractor::calc_coordinate;
///
/// let c = calc_coordinate(&["40", "26", "46", "N", "79", "58", "56", "W"]).unwrap();
/// assert!((c.lat() - 40.44611).abs() < 1e-5);
/// assert!((c.lon() + 79.98222).abs() < 1e-5);
/// ```
pub fn calc_coordinate<S: AsRef<str>>(params: &[S]) -> Result<Coordinate, CoordinateError> {
    let p: Vec<&str> = params
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty() && !s.contains('=') && !s.contains(':'))
        .collect();

    let coordinate = if let Some(c) = degrees_minutes_seconds(&p)? {
        c
    } else if let Some(c) = degrees_minutes(&p)? {
        c
    } else if let Some(c) = degrees_with_hemisphere(&p)? {
        c
    } else if let Some(c) = decimal_pair(&p)? {
        c
    } else {
        debug!("Unrecognized coordinate parameters: {:?}", p);
        return Err(CoordinateError::Shape(p.join("|")));
    };

    Ok(coordinate)
}

fn number(token: &str) -> Result<f64, CoordinateError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CoordinateError::Number(token.to_string()))
}

fn latitude_at(p: &[&str], index: usize) -> Option<Hemisphere> {
    p.get(index)
        .and_then(|t| Hemisphere::parse(t))
        .filter(|h| h.is_latitude())
}

/// Longitude hemisphere at `index`; anything but a west letter means east
fn longitude_at(p: &[&str], index: usize) -> Hemisphere {
    match p.get(index).and_then(|t| Hemisphere::parse(t)) {
        Some(Hemisphere::West) => Hemisphere::West,
        _ => Hemisphere::East,
    }
}

fn degrees_minutes_seconds(p: &[&str]) -> Result<Option<Coordinate>, CoordinateError> {
    if p.len() < 8 {
        return Ok(None);
    }
    let Some(lat_hemisphere) = latitude_at(p, 3) else {
        return Ok(None);
    };
    let lon_hemisphere = longitude_at(p, 7);

    let lat = number(p[0])? + number(p[1])? / 60.0 + number(p[2])? / 3600.0;
    let lon = number(p[4])? + number(p[5])? / 60.0 + number(p[6])? / 3600.0;
    let precision = precision_for(p[2]) / 3600.0;

    Ok(Some(Coordinate::new(
        lat * lat_hemisphere.sign(),
        lon * lon_hemisphere.sign(),
        precision,
    )?))
}

fn degrees_minutes(p: &[&str]) -> Result<Option<Coordinate>, CoordinateError> {
    if p.len() < 5 {
        return Ok(None);
    }
    let Some(lat_hemisphere) = latitude_at(p, 2) else {
        return Ok(None);
    };
    let lon_hemisphere = longitude_at(p, 5);

    let lat = number(p[0])? + number(p[1])? / 60.0;
    let lon = number(p[3])? + number(p[4])? / 60.0;
    let precision = precision_for(p[1]) / 60.0;

    Ok(Some(Coordinate::new(
        lat * lat_hemisphere.sign(),
        lon * lon_hemisphere.sign(),
        precision,
    )?))
}

fn degrees_with_hemisphere(p: &[&str]) -> Result<Option<Coordinate>, CoordinateError> {
    if p.len() < 3 {
        return Ok(None);
    }
    let Some(lat_hemisphere) = latitude_at(p, 1) else {
        return Ok(None);
    };
    let lon_hemisphere = longitude_at(p, 3);

    Ok(Some(Coordinate::new(
        number(p[0])? * lat_hemisphere.sign(),
        number(p[2])? * lon_hemisphere.sign(),
        precision_for(p[0]),
    )?))
}

fn decimal_pair(p: &[&str]) -> Result<Option<Coordinate>, CoordinateError> {
    match p {
        [lat, lon, ..] if lat.contains('.') && lon.contains('.') => Ok(Some(Coordinate::new(
            number(lat)?,
            number(lon)?,
            precision_for(lat),
        )?)),
        _ => Ok(None),
    }
}
