//! Class-specific equivalence between a candidate and a stored value

use infobox_domain::{ClaimTarget, EntityId, EntityLabelLookup, ExtractedValue, PropertyClass};
use tracing::debug;

/// Namespace prefixes a media reference may carry in markup
const MEDIA_PREFIXES: [&str; 2] = ["file:", "image:"];

/// Remove wiki-link square brackets
pub fn strip_link(text: &str) -> String {
    text.replace(['[', ']'], "").trim().to_string()
}

/// Comparable form of a display label or entity-reference text
///
/// Link brackets are dropped, non-breaking spaces become spaces and case is
/// folded.
pub fn normalize_label(text: &str) -> String {
    strip_link(&text.replace('\u{a0}', " ")).to_lowercase()
}

/// Comparable form of a media file name
///
/// ```
/// use infobox_reconciler::normalize_media;
///
/// assert_eq!(normalize_media("[[File:Example_photo.JPG"), "example photo.jpg");
/// assert_eq!(normalize_media("Image:Example photo.jpg"), "example photo.jpg");
/// ```
pub fn normalize_media(text: &str) -> String {
    let lowered = strip_link(text).to_lowercase();
    let name = MEDIA_PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(*prefix))
        .unwrap_or(lowered.as_str());
    name.replace('_', " ").trim().to_string()
}

/// Read a number from the start of a quantity text, ignoring thousands
/// separators (`"1,200 t"` is `1200.0`)
pub fn parse_amount(text: &str) -> Option<f64> {
    let first = text.split_whitespace().next()?;
    first.replace(',', "").parse().ok()
}

/// Whether `candidate` denotes the same value as the stored `target` under the
/// rule of `class`
///
/// Mismatched shapes never match. A failed label lookup counts as "no match"
/// for this target only.
pub fn matches<L>(
    class: PropertyClass,
    candidate: &ExtractedValue,
    target: &ClaimTarget,
    labels: &L,
) -> bool
where
    L: EntityLabelLookup + ?Sized,
{
    match (class, candidate, target) {
        (PropertyClass::EntityReference, ExtractedValue::PlainText(text), ClaimTarget::EntityRef { id }) => {
            entity_matches(text, id, labels)
        }
        (PropertyClass::MediaReference, ExtractedValue::PlainText(text), ClaimTarget::Media { file }) => {
            normalize_media(text) == normalize_media(file)
        }
        (PropertyClass::TimeValue, ExtractedValue::Date(date), ClaimTarget::Time { value }) => {
            date == value
        }
        (PropertyClass::MonolingualText, ExtractedValue::PlainText(text), ClaimTarget::Text { content, .. }) => {
            text == content
        }
        (PropertyClass::Identifier, ExtractedValue::PlainText(text), ClaimTarget::Identifier { value }) => {
            text == value
        }
        (PropertyClass::Quantity, ExtractedValue::PlainText(text), ClaimTarget::Quantity { amount, .. }) => {
            parse_amount(text) == Some(*amount)
        }
        (PropertyClass::Coordinate, ExtractedValue::Coordinate(coord), ClaimTarget::Coordinate(stored)) => {
            coord == stored
        }
        _ => false,
    }
}

fn entity_matches<L>(text: &str, stored: &EntityId, labels: &L) -> bool
where
    L: EntityLabelLookup + ?Sized,
{
    if let Ok(id) = EntityId::parse(&strip_link(text)) {
        return &id == stored;
    }

    match labels.lookup(stored) {
        Ok(label) => normalize_label(&label.label) == normalize_label(text),
        Err(e) => {
            debug!("Treating {} as no match: {}", stored, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infobox_domain::{Coordinate, EntityLabel, LookupError, PartialDate};

    struct FixedLabel(&'static str);

    impl EntityLabelLookup for FixedLabel {
        fn lookup(&self, _entity: &EntityId) -> Result<EntityLabel, LookupError> {
            Ok(EntityLabel::new(self.0, "en"))
        }
    }

    struct Offline;

    impl EntityLabelLookup for Offline {
        fn lookup(&self, _entity: &EntityId) -> Result<EntityLabel, LookupError> {
            Err(LookupError::Unavailable("offline".to_string()))
        }
    }

    fn text(s: &str) -> ExtractedValue {
        ExtractedValue::PlainText(s.to_string())
    }

    fn q(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    #[test]
    fn test_media_ignores_prefix_and_case() {
        let target = ClaimTarget::media("Example.jpg");
        let class = PropertyClass::MediaReference;
        assert!(matches(class, &text("[[File:Example.jpg]]"), &target, &Offline));
        assert!(matches(class, &text("image:EXAMPLE.JPG"), &target, &Offline));
        assert!(!matches(class, &text("Other.jpg"), &target, &Offline));
    }

    #[test]
    fn test_entity_compares_labels_case_insensitively() {
        let target = ClaimTarget::entity(q("Q1"));
        let class = PropertyClass::EntityReference;
        assert!(matches(class, &text("[[example person]]"), &target, &FixedLabel("Example Person")));
        assert!(matches(class, &text("Example Person"), &target, &FixedLabel("Example\u{a0}Person")));
        assert!(!matches(class, &text("Example Person"), &target, &FixedLabel("Other Person")));
    }

    #[test]
    fn test_entity_id_candidate_skips_lookup() {
        let target = ClaimTarget::entity(q("Q596643"));
        let class = PropertyClass::EntityReference;
        assert!(matches(class, &text("Q596643"), &target, &Offline));
        assert!(!matches(class, &text("Q1"), &target, &Offline));
    }

    #[test]
    fn test_lookup_failure_is_no_match() {
        let target = ClaimTarget::entity(q("Q1"));
        assert!(!matches(PropertyClass::EntityReference, &text("Anything"), &target, &Offline));
    }

    #[test]
    fn test_time_is_field_restricted() {
        let target = ClaimTarget::time(PartialDate::year_month(1990, 5).unwrap());
        let class = PropertyClass::TimeValue;
        let month = ExtractedValue::Date(PartialDate::year_month(1990, 5).unwrap());
        let year = ExtractedValue::Date(PartialDate::year(1990).unwrap());
        assert!(matches(class, &month, &target, &Offline));
        assert!(!matches(class, &year, &target, &Offline));
    }

    #[test]
    fn test_text_and_identifier_are_exact() {
        let motto = ClaimTarget::text("Ever Onward", "en");
        assert!(matches(PropertyClass::MonolingualText, &text("Ever Onward"), &motto, &Offline));
        assert!(!matches(PropertyClass::MonolingualText, &text("ever onward"), &motto, &Offline));

        let id = ClaimTarget::identifier("AB-12");
        assert!(matches(PropertyClass::Identifier, &text("AB-12"), &id, &Offline));
        assert!(!matches(PropertyClass::Identifier, &text("ab-12"), &id, &Offline));
    }

    #[test]
    fn test_quantity_ignores_separators() {
        let target = ClaimTarget::quantity(1200.0);
        assert!(matches(PropertyClass::Quantity, &text("1,200 t"), &target, &Offline));
        assert!(!matches(PropertyClass::Quantity, &text("1,201"), &target, &Offline));
        assert!(!matches(PropertyClass::Quantity, &text("many"), &target, &Offline));
    }

    #[test]
    fn test_coordinate_is_exact_including_precision() {
        let coord = Coordinate::new(40.5, -79.5, 0.1).unwrap();
        let finer = Coordinate::new(40.5, -79.5, 0.01).unwrap();
        let target = ClaimTarget::Coordinate(coord);
        let class = PropertyClass::Coordinate;
        assert!(matches(class, &ExtractedValue::Coordinate(coord), &target, &Offline));
        assert!(!matches(class, &ExtractedValue::Coordinate(finer), &target, &Offline));
    }

    #[test]
    fn test_mismatched_shapes_never_match() {
        let target = ClaimTarget::media("Example.jpg");
        assert!(!matches(PropertyClass::Identifier, &text("Example.jpg"), &target, &Offline));
    }
}
