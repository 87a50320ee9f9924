//! Conflict policy for properties that already hold values

use serde::{Deserialize, Serialize};

/// What to do when a property already has claims and the candidate is not a
/// duplicate of any of them
///
/// Supplied by the caller; the core never asks interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the property alone
    Skip,
    /// Replace the existing claims with the candidate
    Overwrite,
    /// Add the candidate next to the existing claims
    #[default]
    Append,
}

impl ConflictPolicy {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Overwrite => "overwrite",
            ConflictPolicy::Append => "append",
        }
    }
}

impl std::str::FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(ConflictPolicy::Skip),
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            "append" => Ok(ConflictPolicy::Append),
            _ => Err(format!("Invalid conflict policy: {}", s)),
        }
    }
}
