//! Error types for the Extractor

use chrono::NaiveDate;
use infobox_domain::{InvalidCoordinate, InvalidDate, PartialDate};
use thiserror::Error;

/// Errors that can occur while extracting one field value
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The value could not be read as a date
    #[error("Date parse failure: {0}")]
    Date(#[from] DateError),

    /// The coordinate sub-template could not be interpreted
    #[error("Coordinate parse failure: {0}")]
    Coordinate(#[from] CoordinateError),

    /// A coordinate property without a `{{coord|...}}` sub-template
    #[error("Field '{0}' has no coordinate template")]
    MissingCoordinateTemplate(String),

    /// The field name could not be turned into a search pattern
    #[error("Invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Reasons a raw date expression could not be normalized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Nothing left to parse after cleanup
    #[error("Empty date")]
    Empty,

    /// Not one, two or three tokens
    #[error("Unsupported date shape: '{0}'")]
    Shape(String),

    /// A month name that no configured locale knows
    #[error("Unknown month '{0}'")]
    Month(String),

    /// A token that should have been a number
    #[error("Invalid number '{0}'")]
    Number(String),

    /// Components out of range (month 0, day 0, year 0, ...)
    #[error("Invalid date: {0}")]
    Invalid(#[from] InvalidDate),
}

/// A date that fails the validity gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{date} is in the future (today is {today})")]
pub struct FutureDate {
    /// The rejected date
    pub date: PartialDate,
    /// Reference date of the check
    pub today: NaiveDate,
}

/// Reasons a coordinate parameter list could not be converted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    /// The parameters match none of the accepted shapes
    #[error("Unrecognized coordinate shape: {0}")]
    Shape(String),

    /// A parameter that should have been a number
    #[error("Invalid number '{0}'")]
    Number(String),

    /// The computed coordinate is out of range
    #[error("{0}")]
    Invalid(#[from] InvalidCoordinate),
}

/// Errors that abort an import plan
#[derive(Error, Debug)]
pub enum ImportError {
    /// Claim store error (the store is unreachable or failed)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
