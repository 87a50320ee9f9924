//! JSON snapshot of records, labels and claims

use infobox_domain::{EntityId, StoredClaim};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records keyed by id
///
/// ```json
/// {
///   "entities": {
///     "Q1": {
///       "labels": { "en": "Example" },
///       "claims": [
///         { "id": "Q1$a", "property": "P18", "target": { "type": "media", "file": "Example.jpg" } }
///       ]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Records in the snapshot
    #[serde(default)]
    pub entities: BTreeMap<EntityId, EntitySnapshot>,
}

/// One record of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Language code → label
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Claims with their qualifiers
    #[serde(default)]
    pub claims: Vec<StoredClaim>,
}

impl Snapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of claims across records
    pub fn claim_count(&self) -> usize {
        self.entities.values().map(|e| e.claims.len()).sum()
    }
}
