//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction/reconciliation
//! core and the knowledge base. Implementations live in other crates; the core
//! only ever reads through them.

use crate::{EntityId, StoredClaim};
use std::fmt;

/// Read-only access to the claims already stored for a record
///
/// Implemented by the infrastructure layer (infobox-store)
pub trait ClaimStore {
    /// Error type for store operations
    type Error;

    /// Every claim of `entity`, across all properties, with qualifiers
    ///
    /// The whole set is returned because a value present as a qualifier on any
    /// claim also counts as existing.
    fn existing_claims(&self, entity: &EntityId) -> Result<Vec<StoredClaim>, Self::Error>;
}

impl<T: ClaimStore + ?Sized> ClaimStore for &T {
    type Error = T::Error;

    fn existing_claims(&self, entity: &EntityId) -> Result<Vec<StoredClaim>, Self::Error> {
        (**self).existing_claims(entity)
    }
}

/// Display label of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabel {
    /// Label text
    pub label: String,
    /// Language of the label
    pub language: String,
}

impl EntityLabel {
    /// Create a label
    pub fn new(label: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            language: language.into(),
        }
    }
}

/// Why a label could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The record has no label (or does not exist)
    NotFound(EntityId),
    /// The lookup backend failed
    Unavailable(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound(id) => write!(f, "no label found for {}", id),
            LookupError::Unavailable(msg) => write!(f, "label lookup unavailable: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

/// Resolve a record id to its display label
///
/// Caching and retry belong to implementations, not to callers.
pub trait EntityLabelLookup {
    /// Look up the label of `entity`
    fn lookup(&self, entity: &EntityId) -> Result<EntityLabel, LookupError>;
}

impl<T: EntityLabelLookup + ?Sized> EntityLabelLookup for &T {
    fn lookup(&self, entity: &EntityId) -> Result<EntityLabel, LookupError> {
        (**self).lookup(entity)
    }
}
