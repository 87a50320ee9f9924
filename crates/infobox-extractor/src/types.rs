//! Request and plan types for an import

use chrono::NaiveDate;
use infobox_domain::{ClaimTarget, EntityId, ExtractedValue, PropertyId, Qualifier};
use infobox_reconciler::{SkipReason, WriteMode};
use serde::Serialize;
use std::fmt;

/// Request to plan the import of one article's infobox into one entity
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Full article markup
    pub article: String,

    /// Entity the claims would be written to
    pub entity: EntityId,

    /// Article revision the markup was read from, for reference URLs
    pub source: Option<SourceRevision>,
}

impl ImportRequest {
    /// Request without revision information
    pub fn new(article: impl Into<String>, entity: EntityId) -> Self {
        Self {
            article: article.into(),
            entity,
            source: None,
        }
    }

    /// Attach the article revision the markup came from
    pub fn with_source(mut self, title: impl Into<String>, revision_id: u64) -> Self {
        self.source = Some(SourceRevision {
            title: title.into(),
            revision_id,
        });
        self
    }
}

/// An article revision on the source wiki
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRevision {
    /// Article title
    pub title: String,

    /// Revision id
    pub revision_id: u64,
}

/// Outcome of planning an import; nothing has been written
#[derive(Debug, Clone, Serialize)]
pub struct ImportPlan {
    /// Target entity
    pub entity: EntityId,

    /// Claims to write
    pub proposals: Vec<ProposedClaim>,

    /// Candidates already present in the store
    pub skipped: Vec<SkippedCandidate>,

    /// Candidates that must not be written
    pub rejected: Vec<RejectedCandidate>,

    /// Metadata about the run
    pub metadata: PlanMetadata,
}

impl ImportPlan {
    /// True when there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// A claim the caller may write
#[derive(Debug, Clone, Serialize)]
pub struct ProposedClaim {
    /// Infobox field the value came from
    pub field: String,

    /// Property to write
    pub property: PropertyId,

    /// Value to write
    pub target: ProposedTarget,

    /// How to write it
    pub mode: WriteMode,

    /// Qualifiers to attach
    pub qualifiers: Vec<Qualifier>,

    /// Provenance references to attach
    pub references: Vec<Reference>,
}

/// Value of a proposed claim
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposedTarget {
    /// A ready value
    Value {
        /// The claim target
        target: ClaimTarget,
    },

    /// An entity still to be resolved from a wiki link
    ArticleLink {
        /// Linked article title
        title: String,
    },
}

impl fmt::Display for ProposedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposedTarget::Value { target } => write!(f, "{}", target),
            ProposedTarget::ArticleLink { title } => write!(f, "[[{}]]", title),
        }
    }
}

/// Provenance attached to a proposal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    /// Wiki edition the value was imported from
    pub imported_from: Option<EntityId>,

    /// Permanent URL of the source revision
    pub url: Option<String>,
}

/// A candidate the reconciler found already present
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCandidate {
    /// Infobox field
    pub field: String,

    /// Property checked
    pub property: PropertyId,

    /// Candidate value
    pub value: ExtractedValue,

    /// Why it was skipped
    pub reason: SkipReason,
}

/// A candidate that must not be written
#[derive(Debug, Clone, Serialize)]
pub struct RejectedCandidate {
    /// Infobox field
    pub field: String,

    /// Raw or extracted value, as text
    pub value: String,

    /// Why it was rejected
    pub reason: Rejection,
}

/// Reasons a candidate is rejected before or after reconciliation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rejection", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    /// The value says "unknown"
    Unknown,

    /// The date fails the future-date gate
    FutureDate,

    /// Entity text that is neither a wiki link nor an entity id
    Unlinked,

    /// The value could not be parsed
    ParseFailure(String),

    /// The value does not fit the property's class
    Mismatch(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unknown => write!(f, "unknown value"),
            Rejection::FutureDate => write!(f, "date in the future"),
            Rejection::Unlinked => write!(f, "plain text, no link to resolve"),
            Rejection::ParseFailure(reason) => write!(f, "parse failure: {}", reason),
            Rejection::Mismatch(reason) => write!(f, "mismatch: {}", reason),
        }
    }
}

/// Metadata about a planning run
#[derive(Debug, Clone, Serialize)]
pub struct PlanMetadata {
    /// Infobox blocks found in the article
    pub blocks: usize,

    /// Distinct fields seen across blocks
    pub fields_seen: usize,

    /// Candidates handed to the reconciler
    pub candidates: usize,

    /// Field names with no mapping
    pub unmapped: Vec<String>,

    /// Reference date of the future-date gate
    pub today: NaiveDate,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
