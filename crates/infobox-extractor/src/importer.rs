//! Import planning: infobox fields to reconciled claim proposals

use crate::config::{ImportConfig, MEDIA_LEGEND, POINT_IN_TIME, SIGNIFICANT_EVENT};
use crate::coordinate::calc_coordinate;
use crate::date::check_not_future;
use crate::error::ImportError;
use crate::extract::{InfoboxRecord, ValueExtractor};
use crate::infobox::find_infoboxes;
use crate::types::{
    ImportPlan, ImportRequest, PlanMetadata, ProposedClaim, ProposedTarget, Reference,
    RejectedCandidate, Rejection, SkippedCandidate,
};
use chrono::NaiveDate;
use infobox_domain::{
    ClaimStore, ClaimTarget, EntityId, EntityLabelLookup, ExtractedValue, Locale, PropertyClass,
    PropertyId, Qualifier, StoredClaim,
};
use infobox_reconciler::{parse_amount, strip_link, Decision, Reconciler, SkipReason, WriteMode};
use std::collections::HashSet;
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Media namespaces stripped from file names before proposing them
const MEDIA_NAMESPACES: [&str; 2] = ["file:", "image:"];

/// Item of the wiki edition written in `locale`
fn wiki_edition(locale: Locale) -> EntityId {
    match locale {
        Locale::En => EntityId::numbered(328),
        Locale::Fr => EntityId::numbered(8447),
        Locale::It => EntityId::numbered(11920),
        Locale::De => EntityId::numbered(48183),
        Locale::Es => EntityId::numbered(8449),
    }
}

/// Plans which infobox values to write to an entity
///
/// The importer never writes: it reads the entity's claims from the store,
/// extracts and reconciles every mapped field, and returns an [`ImportPlan`].
pub struct Importer<S, L>
where
    S: ClaimStore,
    L: EntityLabelLookup,
{
    store: S,
    labels: L,
    reconciler: Reconciler,
    extractor: ValueExtractor,
    config: ImportConfig,
    today: NaiveDate,
}

impl<S, L> Importer<S, L>
where
    S: ClaimStore,
    L: EntityLabelLookup,
    S::Error: Display,
{
    /// Create a new Importer; the configuration is validated first
    pub fn new(store: S, labels: L, config: ImportConfig) -> Result<Self, ImportError> {
        config.validate().map_err(ImportError::Config)?;

        Ok(Self {
            store,
            labels,
            reconciler: Reconciler::new(config.reconcile_config()),
            extractor: ValueExtractor::from_config(&config),
            config,
            today: chrono::Local::now().date_naive(),
        })
    }

    /// Use a fixed reference date for the future-date gate
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Read every infobox of an article, classifying fields by the mapping
    pub fn extract(&self, article: &str) -> Vec<InfoboxRecord> {
        find_infoboxes(article)
            .into_iter()
            .map(|block| {
                self.extractor
                    .extract_record(block, |token| self.config.extraction_class(token.as_str()))
            })
            .collect()
    }

    /// Plan the import of one article into one entity
    ///
    /// # Errors
    ///
    /// Only a store failure aborts planning; malformed values become
    /// rejections in the plan.
    pub fn plan(&self, request: &ImportRequest) -> Result<ImportPlan, ImportError> {
        let start = Instant::now();
        info!("Planning import into {}", request.entity);

        let existing = self
            .store
            .existing_claims(&request.entity)
            .map_err(|e| ImportError::Store(e.to_string()))?;
        debug!("{} has {} existing claims", request.entity, existing.len());

        let records = self.extract(&request.article);
        let mut plan = PlanBuilder::new(&existing, self.references(request));

        // first occurrence of a field across blocks wins
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for record in &records {
            for field in &record.fields {
                if seen.insert(self.config.field_key(field.name.as_str())) {
                    fields.push((field.name.as_str(), &field.value));
                }
            }
            for failure in &record.failures {
                if seen.insert(self.config.field_key(failure.name.as_str())) {
                    plan.reject(failure.name.as_str(), "", Rejection::ParseFailure(failure.reason.clone()));
                }
            }
        }

        let caption = self.text_of(&fields, self.config.caption_field.as_deref());
        let language = self
            .text_of(&fields, self.config.text_language_field.as_deref())
            .map(|l| l.to_lowercase())
            .unwrap_or_else(|| self.config.locale.code().to_string());

        for (name, value) in &fields {
            if let Some(mapping) = self.config.mapping(name) {
                let qualifiers = match (mapping.class, &caption) {
                    (PropertyClass::MediaReference, Some(caption)) => vec![Qualifier {
                        property: PropertyId::numbered(MEDIA_LEGEND),
                        target: ClaimTarget::text(caption.clone(), language.clone()),
                    }],
                    _ => Vec::new(),
                };
                let property = mapping.property.clone();
                self.plan_value(&mut plan, name, &property, mapping.class, value, &language, &qualifiers);
            } else if let Some(item) = self.config.event(name) {
                self.plan_event(&mut plan, name, item, value);
            } else if !self.is_auxiliary(name) {
                plan.unmapped.push(name.to_string());
            }
        }

        self.plan_coordinate_pair(&mut plan, &fields, &language);

        let metadata = PlanMetadata {
            blocks: records.len(),
            fields_seen: seen.len(),
            candidates: plan.candidates,
            unmapped: plan.unmapped,
            today: self.today,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Plan for {}: {} proposed, {} skipped, {} rejected",
            request.entity,
            plan.proposals.len(),
            plan.skipped.len(),
            plan.rejected.len()
        );

        Ok(ImportPlan {
            entity: request.entity.clone(),
            proposals: plan.proposals,
            skipped: plan.skipped,
            rejected: plan.rejected,
            metadata,
        })
    }

    /// Caption, language and lat/lon fields feed other claims
    fn is_auxiliary(&self, name: &str) -> bool {
        let key = self.config.field_key(name);
        let named = |field: &Option<String>| field.as_deref().is_some_and(|f| f == key);
        let in_pair = self
            .config
            .coordinate_fields
            .as_ref()
            .is_some_and(|pair| pair.latitude == key || pair.longitude == key);
        named(&self.config.caption_field) || named(&self.config.text_language_field) || in_pair
    }

    fn text_of(&self, fields: &[(&str, &ExtractedValue)], wanted: Option<&str>) -> Option<String> {
        let wanted = wanted?;
        fields
            .iter()
            .find(|(name, _)| self.config.field_key(name) == wanted)
            .and_then(|(_, value)| match value {
                ExtractedValue::PlainText(text) => Some(text.clone()),
                ExtractedValue::TextList(lines) => Some(lines.join(" ")),
                _ => None,
            })
    }

    fn references(&self, request: &ImportRequest) -> Vec<Reference> {
        let lang = self.config.locale.code();
        let url = request.source.as_ref().map(|source| {
            format!(
                "https://{}.wikipedia.org/w/index.php?title={}&oldid={}",
                lang,
                source.title.replace(' ', "_"),
                source.revision_id
            )
        });
        vec![Reference {
            imported_from: Some(wiki_edition(self.config.locale)),
            url,
        }]
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_value(
        &self,
        plan: &mut PlanBuilder<'_>,
        field: &str,
        property: &PropertyId,
        class: PropertyClass,
        value: &ExtractedValue,
        language: &str,
        qualifiers: &[Qualifier],
    ) {
        for scalar in value.clone().into_scalars() {
            if let Some(rejection) = self.gate(&scalar) {
                plan.reject(field, &scalar.to_string(), rejection);
                continue;
            }

            if self.reconciler.config().is_single_valued(property) {
                let planned = plan.planned(property);
                if planned > 0 {
                    plan.skip(field, property, scalar, SkipReason::SingleValued { existing: planned });
                    continue;
                }
            }

            plan.candidates += 1;
            let decision = match self.reconciler.reconcile(property, &scalar, plan.existing, &self.labels) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!("Cannot reconcile field '{}': {}", field, e);
                    plan.reject(field, &scalar.to_string(), Rejection::Mismatch(e.to_string()));
                    continue;
                }
            };

            let mode = match decision {
                Decision::Skip { reason } => {
                    plan.skip(field, property, scalar, reason);
                    continue;
                }
                Decision::Propose { mode } => mode,
            };

            let target = match self.proposed_target(class, &scalar, language) {
                Ok(target) => target,
                Err(rejection) => {
                    plan.reject(field, &scalar.to_string(), rejection);
                    continue;
                }
            };

            if plan.already_proposed(property, &target) {
                plan.skip(field, property, scalar, SkipReason::Duplicate { claim_id: None });
                continue;
            }

            let references = plan.references.clone();
            plan.propose(ProposedClaim {
                field: field.to_string(),
                property: property.clone(),
                target,
                mode,
                qualifiers: qualifiers.to_vec(),
                references,
            });
        }
    }

    /// A significant-event claim dated by the field's value
    fn plan_event(&self, plan: &mut PlanBuilder<'_>, field: &str, item: &EntityId, value: &ExtractedValue) {
        let ExtractedValue::Date(date) = value else {
            plan.reject(field, &value.to_string(), Rejection::Mismatch("event fields hold dates".to_string()));
            return;
        };
        if let Some(rejection) = self.gate(value) {
            plan.reject(field, &value.to_string(), rejection);
            return;
        }

        let event = PropertyId::numbered(SIGNIFICANT_EVENT);
        let point_in_time = PropertyId::numbered(POINT_IN_TIME);
        let item_target = ClaimTarget::entity(item.clone());
        let target = ProposedTarget::Value {
            target: item_target.clone(),
        };
        let qualifiers = vec![Qualifier {
            property: point_in_time.clone(),
            target: ClaimTarget::time(*date),
        }];

        plan.candidates += 1;
        let existing: &[StoredClaim] = plan.existing;
        let existing_event = existing
            .iter()
            .find(|claim| claim.property == event && claim.target == item_target);

        let mode = match existing_event {
            Some(claim) => {
                match self.reconciler.reconcile_qualifier(claim, &point_in_time, value, &self.labels) {
                    Ok(Decision::Propose { mode }) => mode,
                    Ok(Decision::Skip { reason }) => {
                        plan.skip(field, &event, value.clone(), reason);
                        return;
                    }
                    Err(e) => {
                        plan.reject(field, &value.to_string(), Rejection::Mismatch(e.to_string()));
                        return;
                    }
                }
            }
            None if plan.already_proposed(&event, &target) => {
                plan.skip(field, &event, value.clone(), SkipReason::Duplicate { claim_id: None });
                return;
            }
            None => WriteMode::Add,
        };

        debug!("Event {} on {} ({})", item, date, mode);
        let references = plan.references.clone();
        plan.propose(ProposedClaim {
            field: field.to_string(),
            property: event,
            target,
            mode,
            qualifiers,
            references,
        });
    }

    /// Latitude and longitude fields joined into one coordinate
    fn plan_coordinate_pair(&self, plan: &mut PlanBuilder<'_>, fields: &[(&str, &ExtractedValue)], language: &str) {
        let Some(pair) = &self.config.coordinate_fields else {
            return;
        };
        let lat = self.text_of(fields, Some(pair.latitude.as_str()));
        let lon = self.text_of(fields, Some(pair.longitude.as_str()));
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return;
        };

        let field = format!("{}|{}", pair.latitude, pair.longitude);
        match calc_coordinate(&[lat.as_str(), lon.as_str()]) {
            Ok(coordinate) => {
                let value = ExtractedValue::Coordinate(coordinate);
                self.plan_value(plan, &field, &pair.property, PropertyClass::Coordinate, &value, language, &[]);
            }
            Err(e) => {
                warn!("Cannot read coordinate from '{}': {}", field, e);
                plan.reject(&field, &format!("{}|{}", lat, lon), Rejection::ParseFailure(e.to_string()));
            }
        }
    }

    /// Checks that run before reconciliation
    fn gate(&self, value: &ExtractedValue) -> Option<Rejection> {
        match value {
            ExtractedValue::PlainText(text)
                if self.config.reject_unknown && text.to_lowercase().contains("unknown") =>
            {
                Some(Rejection::Unknown)
            }
            ExtractedValue::Date(date) => match check_not_future(date, self.today) {
                Ok(()) => None,
                Err(e) => {
                    debug!("Rejecting date: {}", e);
                    Some(Rejection::FutureDate)
                }
            },
            _ => None,
        }
    }

    /// The value to write for a proposed candidate
    fn proposed_target(
        &self,
        class: PropertyClass,
        value: &ExtractedValue,
        language: &str,
    ) -> Result<ProposedTarget, Rejection> {
        let target = match (class, value) {
            (PropertyClass::EntityReference, ExtractedValue::PlainText(text)) => {
                let stripped = strip_link(text);
                if let Ok(id) = EntityId::parse(&stripped) {
                    ClaimTarget::entity(id)
                } else if text.contains("[[") || !self.config.require_entity_links {
                    return Ok(ProposedTarget::ArticleLink { title: stripped });
                } else {
                    return Err(Rejection::Unlinked);
                }
            }
            (PropertyClass::MediaReference, ExtractedValue::PlainText(text)) => {
                ClaimTarget::media(media_file_name(text))
            }
            (PropertyClass::MonolingualText, ExtractedValue::PlainText(text)) => {
                ClaimTarget::text(text.trim(), language)
            }
            (PropertyClass::Identifier, ExtractedValue::PlainText(text)) => {
                ClaimTarget::identifier(text.trim())
            }
            (PropertyClass::Quantity, ExtractedValue::PlainText(text)) => match parse_amount(text) {
                Some(amount) => ClaimTarget::quantity(amount),
                None => return Err(Rejection::ParseFailure(format!("'{}' is not a number", text))),
            },
            (PropertyClass::TimeValue, ExtractedValue::Date(date)) => ClaimTarget::time(*date),
            (PropertyClass::Coordinate, ExtractedValue::Coordinate(c)) => ClaimTarget::Coordinate(*c),
            (class, value) => {
                return Err(Rejection::Mismatch(format!("{} value for a {} property", value.kind(), class)))
            }
        };
        Ok(ProposedTarget::Value { target })
    }
}

/// File name of a media link, namespace dropped, case kept
fn media_file_name(text: &str) -> String {
    let stripped = strip_link(text);
    let lowered = stripped.to_lowercase();
    MEDIA_NAMESPACES
        .iter()
        .find(|ns| lowered.starts_with(**ns))
        .map(|ns| stripped[ns.len()..].trim().to_string())
        .unwrap_or(stripped)
}

/// Plan under construction
struct PlanBuilder<'a> {
    existing: &'a [StoredClaim],
    references: Vec<Reference>,
    proposals: Vec<ProposedClaim>,
    skipped: Vec<SkippedCandidate>,
    rejected: Vec<RejectedCandidate>,
    unmapped: Vec<String>,
    candidates: usize,
}

impl<'a> PlanBuilder<'a> {
    fn new(existing: &'a [StoredClaim], references: Vec<Reference>) -> Self {
        Self {
            existing,
            references,
            proposals: Vec::new(),
            skipped: Vec::new(),
            rejected: Vec::new(),
            unmapped: Vec::new(),
            candidates: 0,
        }
    }

    /// Proposals already planned for `property`, qualifier additions excluded
    fn planned(&self, property: &PropertyId) -> usize {
        self.proposals
            .iter()
            .filter(|p| &p.property == property && !matches!(p.mode, WriteMode::Qualify { .. }))
            .count()
    }

    fn already_proposed(&self, property: &PropertyId, target: &ProposedTarget) -> bool {
        self.proposals
            .iter()
            .any(|p| &p.property == property && &p.target == target)
    }

    fn propose(&mut self, claim: ProposedClaim) {
        debug!("Propose {} {} = {}", claim.mode, claim.property, claim.target);
        self.proposals.push(claim);
    }

    fn skip(&mut self, field: &str, property: &PropertyId, value: ExtractedValue, reason: SkipReason) {
        debug!("Skip {} = {}: {}", property, value, reason);
        self.skipped.push(SkippedCandidate {
            field: field.to_string(),
            property: property.clone(),
            value,
            reason,
        });
    }

    fn reject(&mut self, field: &str, value: &str, reason: Rejection) {
        debug!("Reject '{}' = '{}': {}", field, value, reason);
        self.rejected.push(RejectedCandidate {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        });
    }
}
