//! Partial dates - year, year+month, or full day precision

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much of a date is specified
///
/// Ordered from coarsest to finest: `Year < Month < Day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePrecision {
    /// Only the year is known
    Year,
    /// Year and month are known
    Month,
    /// Year, month and day are known
    Day,
}

/// Error returned when date components are out of range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidDate {
    /// Year zero does not exist in the proleptic calendar used here
    ZeroYear,
    /// Month outside 1..=12
    Month(u32),
    /// Day outside the valid range for its month
    Day {
        /// Year of the rejected date
        year: i32,
        /// Month of the rejected date
        month: u32,
        /// Rejected day
        day: u32,
    },
    /// Text did not follow `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    Format(String),
}

impl fmt::Display for InvalidDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDate::ZeroYear => write!(f, "year 0 is not a valid year"),
            InvalidDate::Month(m) => write!(f, "month {} is outside 1..=12", m),
            InvalidDate::Day { year, month, day } => {
                write!(f, "day {} is not valid for {}-{:02}", day, year, month)
            }
            InvalidDate::Format(s) => write!(f, "'{}' is not a YYYY[-MM[-DD]] date", s),
        }
    }
}

impl std::error::Error for InvalidDate {}

/// A date known to year, month or day precision
///
/// Equality is field-restricted: two dates are equal only when they specify the
/// same fields and every specified field matches. `1990` and `1990-05` are
/// therefore *different* values.
///
/// # Examples
///
/// ```
/// use infobox_domain::PartialDate;
///
/// let year = PartialDate::year(1990).unwrap();
/// let month = PartialDate::year_month(1990, 5).unwrap();
/// assert_ne!(year, month);
/// assert_eq!(month.to_string(), "1990-05");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartialDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDate {
    /// A year-only date
    pub fn year(year: i32) -> Result<Self, InvalidDate> {
        if year == 0 {
            return Err(InvalidDate::ZeroYear);
        }
        Ok(Self {
            year,
            month: None,
            day: None,
        })
    }

    /// A year+month date
    pub fn year_month(year: i32, month: u32) -> Result<Self, InvalidDate> {
        let mut date = Self::year(year)?;
        if !(1..=12).contains(&month) {
            return Err(InvalidDate::Month(month));
        }
        date.month = Some(month);
        Ok(date)
    }

    /// A full date; the day is checked against the length of the month
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self, InvalidDate> {
        let mut date = Self::year_month(year, month)?;
        if day == 0 || day > days_in_month(year, month) {
            return Err(InvalidDate::Day { year, month, day });
        }
        date.day = Some(day);
        Ok(date)
    }

    /// Year component
    pub fn year_value(&self) -> i32 {
        self.year
    }

    /// Month component, if specified
    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// Day component, if specified
    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// The precision implied by the specified fields
    pub fn precision(&self) -> DatePrecision {
        match (self.month, self.day) {
            (Some(_), Some(_)) => DatePrecision::Day,
            (Some(_), None) => DatePrecision::Month,
            _ => DatePrecision::Year,
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year < 0 {
            write!(f, "-{:04}", -(self.year as i64))?;
        } else {
            write!(f, "{:04}", self.year)?;
        }
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        Ok(())
    }
}

impl FromStr for PartialDate {
    type Err = InvalidDate;

    /// Parse the canonical `YYYY`, `YYYY-MM` or `YYYY-MM-DD` form
    /// (a leading `-` marks a year before the common era)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || InvalidDate::Format(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let parts: Vec<&str> = body.split('-').collect();
        if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(format_err());
        }

        let year: i32 = parts[0].parse().map_err(|_| format_err())?;
        let year = if negative { -year } else { year };

        match parts.len() {
            1 => Self::year(year),
            2 => {
                let month = parts[1].parse().map_err(|_| format_err())?;
                Self::year_month(year, month)
            }
            _ => {
                let month = parts[1].parse().map_err(|_| format_err())?;
                let day = parts[2].parse().map_err(|_| format_err())?;
                Self::ymd(year, month, day)
            }
        }
    }
}

impl TryFrom<String> for PartialDate {
    type Error = InvalidDate;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PartialDate> for String {
    fn from(date: PartialDate) -> Self {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_restricted_equality() {
        let a = PartialDate::year(1990).unwrap();
        let b = PartialDate::year(1990).unwrap();
        let c = PartialDate::year_month(1990, 5).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(c, PartialDate::ymd(1990, 5, 12).unwrap());
    }

    #[test]
    fn test_precision_hierarchy() {
        assert!(DatePrecision::Year < DatePrecision::Month);
        assert!(DatePrecision::Month < DatePrecision::Day);
        assert_eq!(PartialDate::ymd(2001, 2, 3).unwrap().precision(), DatePrecision::Day);
        assert_eq!(PartialDate::year_month(2001, 2).unwrap().precision(), DatePrecision::Month);
        assert_eq!(PartialDate::year(2001).unwrap().precision(), DatePrecision::Year);
    }

    #[test]
    fn test_rejects_invalid_components() {
        assert_eq!(PartialDate::year(0), Err(InvalidDate::ZeroYear));
        assert_eq!(PartialDate::year_month(1990, 0), Err(InvalidDate::Month(0)));
        assert_eq!(PartialDate::year_month(1990, 13), Err(InvalidDate::Month(13)));
        assert!(PartialDate::ymd(1990, 5, 0).is_err());
        assert!(PartialDate::ymd(1990, 2, 29).is_err());
        assert!(PartialDate::ymd(2000, 2, 29).is_ok());
        assert!(PartialDate::ymd(1900, 2, 29).is_err());
    }

    #[test]
    fn test_display_and_parse() {
        let date = PartialDate::ymd(1990, 5, 12).unwrap();
        assert_eq!(date.to_string(), "1990-05-12");
        assert_eq!("1990-05-12".parse::<PartialDate>().unwrap(), date);
        assert_eq!("1990-5".parse::<PartialDate>().unwrap().month(), Some(5));
        assert_eq!("-0044".parse::<PartialDate>().unwrap().year_value(), -44);
        assert_eq!(PartialDate::year(-44).unwrap().to_string(), "-0044");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<PartialDate>().is_err());
        assert!("May 1990".parse::<PartialDate>().is_err());
        assert!("1990--05".parse::<PartialDate>().is_err());
        assert!("1990-05-12-01".parse::<PartialDate>().is_err());
    }
}
