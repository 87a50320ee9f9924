//! Reconciler configuration

use infobox_domain::{ConflictPolicy, PropertyClass, PropertyId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Property classification and write policy consumed by the [`Reconciler`]
///
/// [`Reconciler`]: crate::Reconciler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Properties that hold at most one value (first claim wins)
    #[serde(default)]
    pub single_valued: BTreeSet<PropertyId>,

    /// What to do when a property already holds other values
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Class of every property the reconciler may see
    #[serde(default)]
    pub classes: BTreeMap<PropertyId, PropertyClass>,
}

impl ReconcileConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a class to a property
    pub fn with_class(mut self, property: PropertyId, class: PropertyClass) -> Self {
        self.classes.insert(property, class);
        self
    }

    /// Mark a property as single-valued
    pub fn with_single_valued(mut self, property: PropertyId) -> Self {
        self.single_valued.insert(property);
        self
    }

    /// Set the conflict policy
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Class of `property`, if configured
    pub fn class_of(&self, property: &PropertyId) -> Option<PropertyClass> {
        self.classes.get(property).copied()
    }

    /// Whether `property` is single-valued
    pub fn is_single_valued(&self, property: &PropertyId) -> bool {
        self.single_valued.contains(property)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for property in &self.single_valued {
            if !self.classes.contains_key(property) {
                return Err(format!(
                    "single-valued property {} has no class",
                    property
                ));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PropertyId {
        PropertyId::parse(s).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ReconcileConfig::default();
        assert!(config.classes.is_empty());
        assert_eq!(config.conflict_policy, ConflictPolicy::Append);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_single_valued_needs_class() {
        let config = ReconcileConfig::new().with_single_valued(pid("P176"));
        assert!(config.validate().is_err());

        let config = config.with_class(pid("P176"), PropertyClass::EntityReference);
        assert!(config.validate().is_ok());
        assert!(config.is_single_valued(&pid("P176")));
        assert_eq!(config.class_of(&pid("P176")), Some(PropertyClass::EntityReference));
    }

    #[test]
    fn test_from_toml() {
        let config = ReconcileConfig::from_toml(
            r#"
            single_valued = ["P1451"]
            conflict_policy = "skip"

            [classes]
            P18 = "media_reference"
            P1451 = "monolingual_text"
            "#,
        )
        .unwrap();

        assert_eq!(config.class_of(&pid("P18")), Some(PropertyClass::MediaReference));
        assert!(config.is_single_valued(&pid("P1451")));
        assert_eq!(config.conflict_policy, ConflictPolicy::Skip);
    }

    #[test]
    fn test_from_toml_rejects_bad_property_id() {
        assert!(ReconcileConfig::from_toml("[classes]\nX18 = \"identifier\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ReconcileConfig::new()
            .with_class(pid("P625"), PropertyClass::Coordinate)
            .with_single_valued(pid("P625"))
            .with_policy(ConflictPolicy::Overwrite);

        let parsed = ReconcileConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
