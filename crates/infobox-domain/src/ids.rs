//! Knowledge-base identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when an identifier string is malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId {
    /// Expected prefix letter (`P` or `Q`)
    pub expected: char,
    /// The rejected input
    pub input: String,
}

impl fmt::Display for InvalidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid identifier '{}': expected '{}' followed by digits",
            self.input, self.expected
        )
    }
}

impl std::error::Error for InvalidId {}

/// Checks the `<letter><digits>` shape shared by property and entity ids
fn parse_prefixed(s: &str, prefix: char) -> Result<String, InvalidId> {
    let trimmed = s.trim();
    let mut chars = trimmed.chars();
    let head = chars.next().map(|c| c.to_ascii_uppercase());
    let rest = chars.as_str();

    if head != Some(prefix) || rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(InvalidId {
            expected: prefix,
            input: s.to_string(),
        });
    }

    Ok(format!("{}{}", prefix, rest))
}

/// Identifier of a knowledge-base property (e.g. `P18`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyId(String);

impl PropertyId {
    /// Parse a property id such as `P625` (a lowercase `p` is accepted)
    ///
    /// # Examples
    ///
    /// ```
    /// use infobox_domain::PropertyId;
    ///
    /// let id = PropertyId::parse("p625").unwrap();
    /// assert_eq!(id.as_str(), "P625");
    /// assert!(PropertyId::parse("Q5").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        parse_prefixed(s, 'P').map(Self)
    }

    /// Build the id `P<number>`
    pub fn numbered(number: u32) -> Self {
        Self(format!("P{}", number))
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PropertyId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PropertyId {
    type Error = InvalidId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PropertyId> for String {
    fn from(id: PropertyId) -> Self {
        id.0
    }
}

/// Identifier of a knowledge-base record (e.g. `Q42`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse an entity id such as `Q42` (a lowercase `q` is accepted)
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        parse_prefixed(s, 'Q').map(Self)
    }

    /// Build the id `Q<number>`
    pub fn numbered(number: u32) -> Self {
        Self(format!("Q{}", number))
    }

    /// Whether `s` is shaped like an entity id
    pub fn looks_like(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = InvalidId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}
