//! Claim reconciliation logic

use crate::equivalence::matches;
use crate::{ReconcileConfig, ReconcileError};
use infobox_domain::{
    ConflictPolicy, EntityLabelLookup, ExtractedValue, PropertyClass, PropertyId, StoredClaim,
};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Outcome of reconciling one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The knowledge base already holds the value (or must not get it)
    Skip {
        /// Why the candidate is skipped
        reason: SkipReason,
    },
    /// No duplicate was found; the caller may write the value
    Propose {
        /// How the value should be written
        mode: WriteMode,
    },
}

impl Decision {
    /// Shorthand for `Decision::Skip`
    pub fn skip(reason: SkipReason) -> Self {
        Decision::Skip { reason }
    }

    /// Shorthand for `Decision::Propose`
    pub fn propose(mode: WriteMode) -> Self {
        Decision::Propose { mode }
    }

    /// Whether the candidate is skipped
    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip { .. })
    }

    /// Whether the candidate is proposed
    pub fn is_propose(&self) -> bool {
        matches!(self, Decision::Propose { .. })
    }
}

/// Reasons for skipping a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The property is single-valued and already has a claim
    SingleValued {
        /// Number of existing claims for the property
        existing: usize,
    },

    /// An existing claim holds an equivalent value
    Duplicate {
        /// Statement id of the matching claim
        claim_id: Option<String>,
    },

    /// An equivalent value is present as a qualifier on some claim
    DuplicateQualifier {
        /// Statement id of the claim carrying the qualifier
        claim_id: Option<String>,
    },

    /// The property holds other values and the conflict policy is `Skip`
    PropertyPresent {
        /// Number of existing claims for the property
        existing: usize,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SingleValued { existing } => {
                write!(f, "single-valued property already has {} claim(s)", existing)
            }
            SkipReason::Duplicate { claim_id } => match claim_id {
                Some(id) => write!(f, "same value exists in claim {}", id),
                None => write!(f, "same value exists"),
            },
            SkipReason::DuplicateQualifier { claim_id } => match claim_id {
                Some(id) => write!(f, "same value exists as a qualifier on {}", id),
                None => write!(f, "same value exists as a qualifier"),
            },
            SkipReason::PropertyPresent { existing } => {
                write!(f, "property already has {} other claim(s)", existing)
            }
        }
    }
}

/// How a proposed value should be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteMode {
    /// Add a new claim next to any existing ones
    Add,
    /// Replace the existing claims of the property
    Replace,
    /// Attach the value as a qualifier to an existing claim
    Qualify {
        /// Statement id of the claim to qualify
        claim_id: Option<String>,
    },
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Add => f.write_str("add"),
            WriteMode::Replace => f.write_str("replace"),
            WriteMode::Qualify { .. } => f.write_str("qualify"),
        }
    }
}

/// Decide whether `candidate` duplicates what is already stored
///
/// `existing` is every claim of the record, not only those of `property`: a
/// value present as a `property` qualifier on any claim is also a duplicate.
/// A single-valued property with any claim of its own is skipped without
/// comparing values. A `TextList` is skipped only when every element is a
/// duplicate.
///
/// The returned proposal is always [`WriteMode::Add`]; conflict policies are
/// applied by [`Reconciler::reconcile`].
pub fn reconcile<L>(
    property: &PropertyId,
    class: PropertyClass,
    candidate: &ExtractedValue,
    existing: &[StoredClaim],
    single_valued: bool,
    labels: &L,
) -> Decision
where
    L: EntityLabelLookup + ?Sized,
{
    let own = existing.iter().filter(|c| &c.property == property).count();
    if single_valued && own > 0 {
        return Decision::skip(SkipReason::SingleValued { existing: own });
    }

    if let ExtractedValue::TextList(items) = candidate {
        let mut first_reason = None;
        for item in items {
            let scalar = ExtractedValue::PlainText(item.clone());
            match find_duplicate(property, class, &scalar, existing, labels) {
                Some(reason) => {
                    first_reason.get_or_insert(reason);
                }
                None => return Decision::propose(WriteMode::Add),
            }
        }
        return match first_reason {
            Some(reason) => Decision::skip(reason),
            None => Decision::propose(WriteMode::Add),
        };
    }

    match find_duplicate(property, class, candidate, existing, labels) {
        Some(reason) => Decision::skip(reason),
        None => Decision::propose(WriteMode::Add),
    }
}

fn find_duplicate<L>(
    property: &PropertyId,
    class: PropertyClass,
    candidate: &ExtractedValue,
    existing: &[StoredClaim],
    labels: &L,
) -> Option<SkipReason>
where
    L: EntityLabelLookup + ?Sized,
{
    for claim in existing.iter().filter(|c| &c.property == property) {
        if matches(class, candidate, &claim.target, labels) {
            return Some(SkipReason::Duplicate {
                claim_id: claim.id.clone(),
            });
        }
    }

    for claim in existing {
        let hit = claim
            .qualifiers
            .iter()
            .filter(|q| &q.property == property)
            .any(|q| matches(class, candidate, &q.target, labels));
        if hit {
            return Some(SkipReason::DuplicateQualifier {
                claim_id: claim.id.clone(),
            });
        }
    }

    None
}

/// The Reconciler applies the configured classes, single-valued set and
/// conflict policy
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a new Reconciler with the given configuration
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile a candidate for `property` against every claim of the record
    ///
    /// # Errors
    ///
    /// Fails when `property` has no configured class, or when the candidate's
    /// shape cannot be compared under that class.
    pub fn reconcile<L>(
        &self,
        property: &PropertyId,
        candidate: &ExtractedValue,
        existing: &[StoredClaim],
        labels: &L,
    ) -> Result<Decision, ReconcileError>
    where
        L: EntityLabelLookup + ?Sized,
    {
        let class = self.class_for(property, candidate)?;
        let single_valued = self.config.is_single_valued(property);

        let decision = reconcile(property, class, candidate, existing, single_valued, labels);
        let decision = self.apply_policy(property, decision, existing);

        debug!("{} = {}: {:?}", property, candidate, decision);
        Ok(decision)
    }

    /// Reconcile a candidate qualifier value against one existing claim
    ///
    /// Skips when the claim already carries an equivalent `qualifier`,
    /// otherwise proposes qualifying that claim.
    pub fn reconcile_qualifier<L>(
        &self,
        claim: &StoredClaim,
        qualifier: &PropertyId,
        candidate: &ExtractedValue,
        labels: &L,
    ) -> Result<Decision, ReconcileError>
    where
        L: EntityLabelLookup + ?Sized,
    {
        let class = self.class_for(qualifier, candidate)?;

        let present = claim
            .qualifiers
            .iter()
            .filter(|q| &q.property == qualifier)
            .any(|q| matches(class, candidate, &q.target, labels));

        let claim_id = claim.id.clone();
        let decision = if present {
            Decision::skip(SkipReason::DuplicateQualifier { claim_id })
        } else {
            Decision::propose(WriteMode::Qualify { claim_id })
        };

        debug!("{} qualifier {} = {}: {:?}", claim.property, qualifier, candidate, decision);
        Ok(decision)
    }

    fn class_for(
        &self,
        property: &PropertyId,
        candidate: &ExtractedValue,
    ) -> Result<PropertyClass, ReconcileError> {
        let class = self
            .config
            .class_of(property)
            .ok_or_else(|| ReconcileError::UnknownProperty(property.clone()))?;

        let compatible = match class {
            PropertyClass::TimeValue => matches!(candidate, ExtractedValue::Date(_)),
            PropertyClass::Coordinate => matches!(candidate, ExtractedValue::Coordinate(_)),
            _ => matches!(
                candidate,
                ExtractedValue::PlainText(_) | ExtractedValue::TextList(_)
            ),
        };

        if !compatible {
            return Err(ReconcileError::ClassMismatch {
                class,
                kind: candidate.kind(),
            });
        }
        Ok(class)
    }

    /// Turn an `Add` proposal into what the conflict policy asks for when the
    /// property already holds other values
    fn apply_policy(
        &self,
        property: &PropertyId,
        decision: Decision,
        existing: &[StoredClaim],
    ) -> Decision {
        if decision != Decision::propose(WriteMode::Add) {
            return decision;
        }

        let own = existing.iter().filter(|c| &c.property == property).count();
        if own == 0 {
            return decision;
        }

        match self.config.conflict_policy {
            ConflictPolicy::Skip => Decision::skip(SkipReason::PropertyPresent { existing: own }),
            ConflictPolicy::Overwrite => Decision::propose(WriteMode::Replace),
            ConflictPolicy::Append => decision,
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infobox_domain::{
        ClaimTarget, Coordinate, EntityId, EntityLabel, LookupError, PartialDate,
    };
    use std::collections::HashMap;

    // Label lookup backed by a map; unknown ids fail like an unreachable backend
    struct MockLabels(HashMap<EntityId, String>);

    impl MockLabels {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self(pairs.iter().map(|(id, label)| (q(id), label.to_string())).collect())
        }
    }

    impl EntityLabelLookup for MockLabels {
        fn lookup(&self, entity: &EntityId) -> Result<EntityLabel, LookupError> {
            self.0
                .get(entity)
                .map(|label| EntityLabel::new(label.clone(), "en"))
                .ok_or_else(|| LookupError::Unavailable(format!("no route to {}", entity)))
        }
    }

    fn pid(s: &str) -> PropertyId {
        PropertyId::parse(s).unwrap()
    }

    fn q(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn text(s: &str) -> ExtractedValue {
        ExtractedValue::PlainText(s.to_string())
    }

    fn create_test_reconciler() -> Reconciler {
        Reconciler::new(
            ReconcileConfig::new()
                .with_class(pid("P18"), PropertyClass::MediaReference)
                .with_class(pid("P138"), PropertyClass::EntityReference)
                .with_class(pid("P176"), PropertyClass::EntityReference)
                .with_class(pid("P585"), PropertyClass::TimeValue)
                .with_class(pid("P625"), PropertyClass::Coordinate)
                .with_class(pid("P1449"), PropertyClass::MonolingualText)
                .with_single_valued(pid("P176")),
        )
    }

    #[test]
    fn test_media_duplicate_is_skipped() {
        let reconciler = create_test_reconciler();
        let existing = vec![StoredClaim::new(pid("P18"), ClaimTarget::media("Example.jpg")).with_id("S1")];

        let decision = reconciler
            .reconcile(&pid("P18"), &text("[[File:Example.jpg]]"), &existing, &MockLabels::new(&[]))
            .unwrap();

        assert_eq!(
            decision,
            Decision::skip(SkipReason::Duplicate { claim_id: Some("S1".into()) })
        );
    }

    #[test]
    fn test_entity_reference_through_labels() {
        let reconciler = create_test_reconciler();
        let existing = vec![StoredClaim::new(pid("P138"), ClaimTarget::entity(q("Q7")))];

        let same = MockLabels::new(&[("Q7", "Example Person")]);
        let decision = reconciler.reconcile(&pid("P138"), &text("Example Person"), &existing, &same).unwrap();
        assert!(decision.is_skip());

        let other = MockLabels::new(&[("Q7", "Other Person")]);
        let decision = reconciler.reconcile(&pid("P138"), &text("Example Person"), &existing, &other).unwrap();
        assert_eq!(decision, Decision::propose(WriteMode::Add));
    }

    #[test]
    fn test_lookup_failure_continues_scanning() {
        let reconciler = create_test_reconciler();
        let existing = vec![
            StoredClaim::new(pid("P138"), ClaimTarget::entity(q("Q1"))),
            StoredClaim::new(pid("P138"), ClaimTarget::entity(q("Q2"))).with_id("S2"),
        ];
        // Q1 cannot be resolved, Q2 can
        let labels = MockLabels::new(&[("Q2", "Example Person")]);

        let decision = reconciler.reconcile(&pid("P138"), &text("[[Example Person]]"), &existing, &labels).unwrap();
        assert_eq!(
            decision,
            Decision::skip(SkipReason::Duplicate { claim_id: Some("S2".into()) })
        );
    }

    #[test]
    fn test_single_valued_skips_without_comparing() {
        let reconciler = create_test_reconciler();
        let existing = vec![StoredClaim::new(pid("P176"), ClaimTarget::entity(q("Q1")))];

        let decision = reconciler
            .reconcile(&pid("P176"), &text("[[Anyone Else]]"), &existing, &MockLabels::new(&[]))
            .unwrap();
        assert_eq!(decision, Decision::skip(SkipReason::SingleValued { existing: 1 }));
    }

    #[test]
    fn test_single_valued_ignores_other_properties() {
        let reconciler = create_test_reconciler();
        let existing = vec![StoredClaim::new(pid("P138"), ClaimTarget::entity(q("Q1")))];

        let decision = reconciler
            .reconcile(&pid("P176"), &text("[[Builder]]"), &existing, &MockLabels::new(&[]))
            .unwrap();
        assert!(decision.is_propose());
    }

    #[test]
    fn test_qualifier_duplicate_on_any_claim() {
        let reconciler = create_test_reconciler();
        let existing = vec![StoredClaim::new(pid("P793"), ClaimTarget::entity(q("Q596643")))
            .with_id("S9")
            .with_qualifier(pid("P1449"), ClaimTarget::text("Old Ironsides", "en"))];

        let decision = reconciler
            .reconcile(&pid("P1449"), &text("Old Ironsides"), &existing, &MockLabels::new(&[]))
            .unwrap();
        assert_eq!(
            decision,
            Decision::skip(SkipReason::DuplicateQualifier { claim_id: Some("S9".into()) })
        );
    }

    #[test]
    fn test_text_list_needs_every_element_duplicated() {
        let reconciler = create_test_reconciler();
        let existing = vec![StoredClaim::new(pid("P1449"), ClaimTarget::text("Alpha", "en"))];
        let labels = MockLabels::new(&[]);

        let partial = ExtractedValue::TextList(vec!["Alpha".into(), "Beta".into()]);
        assert!(reconciler.reconcile(&pid("P1449"), &partial, &existing, &labels).unwrap().is_propose());

        let full = ExtractedValue::TextList(vec!["Alpha".into(), "Alpha".into()]);
        assert!(reconciler.reconcile(&pid("P1449"), &full, &existing, &labels).unwrap().is_skip());
    }

    #[test]
    fn test_conflict_policies() {
        let existing = vec![StoredClaim::new(pid("P1449"), ClaimTarget::text("Alpha", "en"))];
        let labels = MockLabels::new(&[]);
        let candidate = text("Beta");

        let with_policy = |policy| {
            let config = create_test_reconciler().config().clone().with_policy(policy);
            Reconciler::new(config)
                .reconcile(&pid("P1449"), &candidate, &existing, &labels)
                .unwrap()
        };

        assert_eq!(
            with_policy(ConflictPolicy::Skip),
            Decision::skip(SkipReason::PropertyPresent { existing: 1 })
        );
        assert_eq!(with_policy(ConflictPolicy::Overwrite), Decision::propose(WriteMode::Replace));
        assert_eq!(with_policy(ConflictPolicy::Append), Decision::propose(WriteMode::Add));
    }

    #[test]
    fn test_policy_not_applied_to_empty_property() {
        let reconciler = Reconciler::new(
            create_test_reconciler().config().clone().with_policy(ConflictPolicy::Skip),
        );
        let decision = reconciler
            .reconcile(&pid("P1449"), &text("Beta"), &[], &MockLabels::new(&[]))
            .unwrap();
        assert_eq!(decision, Decision::propose(WriteMode::Add));
    }

    #[test]
    fn test_coordinate_and_date_candidates() {
        let reconciler = create_test_reconciler();
        let coord = Coordinate::new(40.44611, -79.98222, 1.0 / 3600.0).unwrap();
        let existing = vec![StoredClaim::new(pid("P625"), ClaimTarget::Coordinate(coord))];
        let labels = MockLabels::new(&[]);

        let same = ExtractedValue::Coordinate(coord);
        assert!(reconciler.reconcile(&pid("P625"), &same, &existing, &labels).unwrap().is_skip());

        let coarser = ExtractedValue::Coordinate(Coordinate::new(40.44611, -79.98222, 0.1).unwrap());
        assert!(reconciler.reconcile(&pid("P625"), &coarser, &existing, &labels).unwrap().is_propose());
    }

    #[test]
    fn test_unknown_property() {
        let reconciler = create_test_reconciler();
        let result = reconciler.reconcile(&pid("P9999"), &text("x"), &[], &MockLabels::new(&[]));
        assert_eq!(result, Err(ReconcileError::UnknownProperty(pid("P9999"))));
    }

    #[test]
    fn test_class_mismatch() {
        let reconciler = create_test_reconciler();
        let result = reconciler.reconcile(&pid("P585"), &text("1990"), &[], &MockLabels::new(&[]));
        match result {
            Err(ReconcileError::ClassMismatch { class, kind }) => {
                assert_eq!(class, PropertyClass::TimeValue);
                assert_eq!(kind, "text");
            }
            other => panic!("Expected ClassMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_qualifier() {
        let reconciler = create_test_reconciler();
        let date = ExtractedValue::Date(PartialDate::ymd(1950, 3, 4).unwrap());
        let labels = MockLabels::new(&[]);

        let bare = StoredClaim::new(pid("P793"), ClaimTarget::entity(q("Q596643"))).with_id("S1");
        assert_eq!(
            reconciler.reconcile_qualifier(&bare, &pid("P585"), &date, &labels).unwrap(),
            Decision::propose(WriteMode::Qualify { claim_id: Some("S1".into()) })
        );

        let dated = bare.with_qualifier(
            pid("P585"),
            ClaimTarget::time(PartialDate::ymd(1950, 3, 4).unwrap()),
        );
        assert!(reconciler.reconcile_qualifier(&dated, &pid("P585"), &date, &labels).unwrap().is_skip());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_target() -> impl Strategy<Value = ClaimTarget> {
            prop_oneof![
                "[A-Za-z ]{1,12}".prop_map(|s| ClaimTarget::text(s, "en")),
                "[A-Za-z]{1,8}\\.jpg".prop_map(ClaimTarget::media),
                (1u32..9999).prop_map(|n| ClaimTarget::entity(q(&format!("Q{}", n)))),
            ]
        }

        proptest! {
            #[test]
            fn empty_existing_set_always_proposes(
                value in "[A-Za-z0-9 ]{1,20}",
                class_idx in 0usize..7,
                single in any::<bool>(),
            ) {
                let class = PropertyClass::ALL[class_idx];
                let candidate = ExtractedValue::PlainText(value);
                let decision = reconcile(
                    &pid("P1"), class, &candidate, &[], single, &MockLabels::new(&[]),
                );
                prop_assert_eq!(decision, Decision::propose(WriteMode::Add));
            }

            #[test]
            fn single_valued_with_claims_always_skips(
                value in "[A-Za-z0-9 ]{1,20}",
                targets in prop::collection::vec(any_target(), 1..5),
                class_idx in 0usize..7,
            ) {
                let class = PropertyClass::ALL[class_idx];
                let existing: Vec<StoredClaim> = targets
                    .into_iter()
                    .map(|t| StoredClaim::new(pid("P1"), t))
                    .collect();
                let n = existing.len();
                let candidate = ExtractedValue::PlainText(value);
                let decision = reconcile(
                    &pid("P1"), class, &candidate, &existing, true, &MockLabels::new(&[]),
                );
                prop_assert_eq!(decision, Decision::skip(SkipReason::SingleValued { existing: n }));
            }
        }
    }
}
