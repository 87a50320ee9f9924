//! Configuration for infobox imports

use infobox_domain::{ConflictPolicy, EntityId, Locale, PropertyClass, PropertyId};
use infobox_reconciler::ReconcileConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property of significant-event claims
pub const SIGNIFICANT_EVENT: u32 = 793;
/// Date qualifier of significant-event claims
pub const POINT_IN_TIME: u32 = 585;
/// Caption qualifier of media claims
pub const MEDIA_LEGEND: u32 = 2096;
/// Reference property naming the source wiki
pub const IMPORTED_FROM: u32 = 143;
/// Reference property holding the source revision URL
pub const REFERENCE_URL: u32 = 4656;

/// How one infobox field maps onto a knowledge-base property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Target property
    pub property: PropertyId,

    /// Value class of the property
    pub class: PropertyClass,

    /// The property holds at most one value
    #[serde(default)]
    pub single_valued: bool,
}

impl FieldMapping {
    /// A multi-valued mapping
    pub fn new(property: u32, class: PropertyClass) -> Self {
        Self {
            property: PropertyId::numbered(property),
            class,
            single_valued: false,
        }
    }

    /// A single-valued mapping
    pub fn single(property: u32, class: PropertyClass) -> Self {
        Self {
            single_valued: true,
            ..Self::new(property, class)
        }
    }
}

/// Separate latitude/longitude fields combined into one coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateFields {
    /// Latitude field name
    pub latitude: String,

    /// Longitude field name
    pub longitude: String,

    /// Target coordinate property
    pub property: PropertyId,

    /// The property holds at most one value
    #[serde(default)]
    pub single_valued: bool,
}

/// Tokenizer behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    /// Accept field names containing spaces (`| Ship builder =`)
    #[serde(default)]
    pub spaced_names: bool,
}

/// Configuration for the [`Importer`](crate::Importer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Language of the source articles (month names, text language, provenance)
    #[serde(default)]
    pub locale: Locale,

    /// What to do when a property already holds other values
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Prefixes stripped (case-insensitively) from field names before lookup
    #[serde(default)]
    pub field_prefixes: Vec<String>,

    /// Field holding the caption of the infobox image
    #[serde(default)]
    pub caption_field: Option<String>,

    /// Field naming the language of monolingual text values
    #[serde(default)]
    pub text_language_field: Option<String>,

    /// Reject candidates mentioning "unknown"
    #[serde(default = "default_true")]
    pub reject_unknown: bool,

    /// Entity references must be wiki links or entity ids to be proposed
    #[serde(default = "default_true")]
    pub require_entity_links: bool,

    /// Tokenizer behaviour
    #[serde(default)]
    pub tokenizer: TokenizerOptions,

    /// Latitude/longitude field pair
    #[serde(default)]
    pub coordinate_fields: Option<CoordinateFields>,

    /// Field name → property mapping
    #[serde(default)]
    pub fields: BTreeMap<String, FieldMapping>,

    /// Field name → significant-event item, dated by the field's value
    #[serde(default)]
    pub events: BTreeMap<String, EntityId>,
}

fn default_true() -> bool {
    true
}

impl Default for ImportConfig {
    /// Empty mapping, English, append policy
    fn default() -> Self {
        Self {
            locale: Locale::En,
            conflict_policy: ConflictPolicy::Append,
            field_prefixes: Vec::new(),
            caption_field: None,
            text_language_field: None,
            reject_unknown: true,
            require_entity_links: true,
            tokenizer: TokenizerOptions::default(),
            coordinate_fields: None,
            fields: BTreeMap::new(),
            events: BTreeMap::new(),
        }
    }
}

impl ImportConfig {
    /// Ship infobox preset
    pub fn ships() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("image".to_string(), FieldMapping::new(18, PropertyClass::MediaReference));
        fields.insert("namesake".to_string(), FieldMapping::new(138, PropertyClass::EntityReference));
        fields.insert("builder".to_string(), FieldMapping::single(176, PropertyClass::EntityReference));
        fields.insert("manufacturer".to_string(), FieldMapping::single(176, PropertyClass::EntityReference));
        fields.insert("motto".to_string(), FieldMapping::single(1451, PropertyClass::MonolingualText));
        fields.insert("nickname".to_string(), FieldMapping::new(1449, PropertyClass::MonolingualText));
        fields.insert("country".to_string(), FieldMapping::single(8047, PropertyClass::EntityReference));

        let mut events = BTreeMap::new();
        events.insert("ordered".to_string(), EntityId::numbered(566889));
        events.insert("laid down".to_string(), EntityId::numbered(14592615));
        events.insert("launched".to_string(), EntityId::numbered(596643));
        events.insert("commissioned".to_string(), EntityId::numbered(14475832));

        Self {
            tokenizer: TokenizerOptions { spaced_names: true },
            field_prefixes: vec!["Ship ".to_string()],
            caption_field: Some("caption".to_string()),
            fields,
            events,
            ..Self::default()
        }
    }

    /// Historic place infobox preset
    pub fn historic_places() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("image".to_string(), FieldMapping::new(18, PropertyClass::MediaReference));
        fields.insert("architecture".to_string(), FieldMapping::single(149, PropertyClass::EntityReference));
        fields.insert("built".to_string(), FieldMapping::single(571, PropertyClass::TimeValue));
        fields.insert("coordinates".to_string(), FieldMapping::single(625, PropertyClass::Coordinate));
        fields.insert("refnum".to_string(), FieldMapping::single(649, PropertyClass::Identifier));

        Self {
            caption_field: Some("caption".to_string()),
            text_language_field: Some("native_name_lang".to_string()),
            coordinate_fields: Some(CoordinateFields {
                latitude: "lat".to_string(),
                longitude: "lon".to_string(),
                property: PropertyId::numbered(625),
                single_valued: true,
            }),
            fields,
            ..Self::default()
        }
    }

    /// Lookup key of a field name: whitespace collapsed, lowercased, prefixes
    /// stripped
    pub fn field_key(&self, name: &str) -> String {
        let key = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        for prefix in &self.field_prefixes {
            if let Some(rest) = key.strip_prefix(&prefix.to_lowercase()) {
                let rest = rest.trim();
                if !rest.is_empty() {
                    return rest.to_string();
                }
            }
        }
        key
    }

    /// Mapping of a field, if any
    pub fn mapping(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(&self.field_key(name))
    }

    /// Event item of a field, if any
    pub fn event(&self, name: &str) -> Option<&EntityId> {
        self.events.get(&self.field_key(name))
    }

    /// Class the extractor should read a field as
    ///
    /// Event fields hold dates; unmapped fields are read as text.
    pub fn extraction_class(&self, name: &str) -> Option<PropertyClass> {
        if let Some(mapping) = self.mapping(name) {
            return Some(mapping.class);
        }
        self.event(name).map(|_| PropertyClass::TimeValue)
    }

    /// Reconciler configuration implied by the mapping
    pub fn reconcile_config(&self) -> ReconcileConfig {
        let mut config = ReconcileConfig::new().with_policy(self.conflict_policy);

        for mapping in self.fields.values() {
            config = config.with_class(mapping.property.clone(), mapping.class);
            if mapping.single_valued {
                config = config.with_single_valued(mapping.property.clone());
            }
        }

        if let Some(pair) = &self.coordinate_fields {
            config = config.with_class(pair.property.clone(), PropertyClass::Coordinate);
            if pair.single_valued {
                config = config.with_single_valued(pair.property.clone());
            }
        }

        if !self.events.is_empty() {
            config = config
                .with_class(PropertyId::numbered(SIGNIFICANT_EVENT), PropertyClass::EntityReference)
                .with_class(PropertyId::numbered(POINT_IN_TIME), PropertyClass::TimeValue);
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for name in self.fields.keys().chain(self.events.keys()) {
            if name.trim().is_empty() {
                return Err("field names must not be empty".to_string());
            }
            if name != &name.trim().to_lowercase() {
                return Err(format!("field name '{}' must be trimmed and lowercase", name));
            }
        }
        if let Some(name) = self.events.keys().find(|name| self.fields.contains_key(*name)) {
            return Err(format!("field '{}' is mapped both as a property and as an event", name));
        }
        if let Some(pair) = &self.coordinate_fields {
            if pair.latitude.trim().is_empty() || pair.longitude.trim().is_empty() {
                return Err("coordinate_fields needs both latitude and longitude".to_string());
            }
        }
        for mapping in self.fields.values() {
            let clash = self
                .fields
                .values()
                .any(|other| other.property == mapping.property && other.class != mapping.class);
            if clash {
                return Err(format!("property {} is mapped with two classes", mapping.property));
            }
        }
        self.reconcile_config().validate()
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

    #[test]
    fn test_default_config_is_valid() {
        assert!(ImportConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ImportConfig::ships().validate().is_ok());
        assert!(ImportConfig::historic_places().validate().is_ok());
    }

    #[test]
    fn test_field_key_strips_prefix() {
        let config = ImportConfig::ships();
        assert_eq!(config.field_key("Ship builder"), "builder");
        assert_eq!(config.field_key(" ship  laid down "), "laid down");
        assert_eq!(config.field_key("Ship"), "ship");
        assert_eq!(config.field_key("Shipyard"), "shipyard");
        assert_eq!(config.field_key("Image"), "image");
    }

    #[test]
    fn test_extraction_class() {
        let config = ImportConfig::ships();
        assert_eq!(config.extraction_class("Ship image"), Some(PropertyClass::MediaReference));
        assert_eq!(config.extraction_class("Ship launched"), Some(PropertyClass::TimeValue));
        assert_eq!(config.extraction_class("Ship caption"), None);
    }

    #[test]
    fn test_reconcile_config_from_mapping() {
        let config = ImportConfig::ships().reconcile_config();
        let builder = PropertyId::numbered(176);
        assert!(config.is_single_valued(&builder));
        assert_eq!(config.class_of(&builder), Some(PropertyClass::EntityReference));
        assert_eq!(
            config.class_of(&PropertyId::numbered(POINT_IN_TIME)),
            Some(PropertyClass::TimeValue)
        );
    }

    #[test]
    fn test_invalid_field_name() {
        let mut config = ImportConfig::default();
        config.fields.insert("Image".to_string(), FieldMapping::new(18, PropertyClass::MediaReference));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conflicting_classes() {
        let mut config = ImportConfig::default();
        config.fields.insert("a".to_string(), FieldMapping::new(18, PropertyClass::MediaReference));
        config.fields.insert("b".to_string(), FieldMapping::new(18, PropertyClass::Identifier));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = ImportConfig::from_toml(
            r#"
            locale = "fr"
            conflict_policy = "skip"
            field_prefixes = ["Navire "]

            [fields.image]
            property = "P18"
            class = "media_reference"

            [fields.devise]
            property = "P1451"
            class = "monolingual_text"
            single_valued = true

            [events]
            lancement = "Q596643"
            "#,
        )
        .unwrap();

        assert_eq!(config.locale, Locale::Fr);
        assert!(config.reject_unknown);
        assert_eq!(config.mapping("Navire devise").map(|m| m.single_valued), Some(true));
        assert_eq!(config.event("lancement").map(|e| e.as_str()), Some("Q596643"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ImportConfig::historic_places();
        let toml_str = config.to_toml().unwrap();
        let parsed = ImportConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
