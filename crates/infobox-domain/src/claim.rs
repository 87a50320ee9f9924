//! Stored claims - the knowledge-base side of reconciliation

use crate::{Coordinate, EntityId, PartialDate, PropertyId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type of a property
///
/// Each property id belongs to exactly one class. The class picks the
/// normalizer used on extraction and the equivalence rule used on
/// reconciliation. Class assignment is configuration, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyClass {
    /// Points at another record (compared through its label)
    EntityReference,
    /// A media file name
    MediaReference,
    /// A partial date
    TimeValue,
    /// Text in a given language
    MonolingualText,
    /// An external identifier string
    Identifier,
    /// A numeric amount
    Quantity,
    /// A geographic coordinate
    Coordinate,
}

impl PropertyClass {
    /// All classes, in declaration order
    pub const ALL: [PropertyClass; 7] = [
        PropertyClass::EntityReference,
        PropertyClass::MediaReference,
        PropertyClass::TimeValue,
        PropertyClass::MonolingualText,
        PropertyClass::Identifier,
        PropertyClass::Quantity,
        PropertyClass::Coordinate,
    ];

    /// Get the class name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyClass::EntityReference => "entity_reference",
            PropertyClass::MediaReference => "media_reference",
            PropertyClass::TimeValue => "time_value",
            PropertyClass::MonolingualText => "monolingual_text",
            PropertyClass::Identifier => "identifier",
            PropertyClass::Quantity => "quantity",
            PropertyClass::Coordinate => "coordinate",
        }
    }

    /// Parse a class from its name (case-insensitive, `-` or `_` separated)
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }
}

impl fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid property class: {}", s))
    }
}

/// The value a stored claim points at
///
/// Owned by the knowledge base; reconciliation only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimTarget {
    /// Reference to another record
    EntityRef {
        /// Referenced record
        id: EntityId,
    },
    /// Monolingual text
    Text {
        /// Text content
        content: String,
        /// Language code of the content
        language: String,
    },
    /// A partial date
    Time {
        /// The stored date
        value: PartialDate,
    },
    /// A coordinate with precision
    Coordinate(Coordinate),
    /// External identifier
    Identifier {
        /// Identifier string
        value: String,
    },
    /// Media file
    Media {
        /// File name, possibly with a namespace prefix
        file: String,
    },
    /// Numeric amount
    Quantity {
        /// Amount
        amount: f64,
        /// Unit record, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<EntityId>,
    },
}

impl ClaimTarget {
    /// Reference to the record `id`
    pub fn entity(id: EntityId) -> Self {
        ClaimTarget::EntityRef { id }
    }

    /// Monolingual text
    pub fn text(content: impl Into<String>, language: impl Into<String>) -> Self {
        ClaimTarget::Text {
            content: content.into(),
            language: language.into(),
        }
    }

    /// A stored date
    pub fn time(value: PartialDate) -> Self {
        ClaimTarget::Time { value }
    }

    /// An identifier string
    pub fn identifier(value: impl Into<String>) -> Self {
        ClaimTarget::Identifier {
            value: value.into(),
        }
    }

    /// A media file
    pub fn media(file: impl Into<String>) -> Self {
        ClaimTarget::Media { file: file.into() }
    }

    /// A unitless amount
    pub fn quantity(amount: f64) -> Self {
        ClaimTarget::Quantity { amount, unit: None }
    }
}

impl fmt::Display for ClaimTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimTarget::EntityRef { id } => write!(f, "{}", id),
            ClaimTarget::Text { content, language } => write!(f, "{} ({})", content, language),
            ClaimTarget::Time { value } => write!(f, "{}", value),
            ClaimTarget::Coordinate(coord) => write!(f, "{}", coord),
            ClaimTarget::Identifier { value } => f.write_str(value),
            ClaimTarget::Media { file } => f.write_str(file),
            ClaimTarget::Quantity { amount, unit } => match unit {
                Some(unit) => write!(f, "{} {}", amount, unit),
                None => write!(f, "{}", amount),
            },
        }
    }
}

/// A secondary property/value pair attached to a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualifier {
    /// Qualifier property
    pub property: PropertyId,
    /// Qualifier value
    pub target: ClaimTarget,
}

/// A claim already present in the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredClaim {
    /// Statement identifier assigned by the knowledge base, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claim property
    pub property: PropertyId,

    /// Claim value
    pub target: ClaimTarget,

    /// Qualifiers attached to this claim
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
}

impl StoredClaim {
    /// Create a claim without qualifiers
    pub fn new(property: PropertyId, target: ClaimTarget) -> Self {
        Self {
            id: None,
            property,
            target,
            qualifiers: Vec::new(),
        }
    }

    /// Attach a statement id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a qualifier
    pub fn with_qualifier(mut self, property: PropertyId, target: ClaimTarget) -> Self {
        self.qualifiers.push(Qualifier { property, target });
        self
    }
}
