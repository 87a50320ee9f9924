//! Infobox Extractor
//!
//! Reads typed values out of infobox markup and plans which of them to write
//! to a knowledge-base record.
//!
//! # Overview
//!
//! Article markup is cut into infobox blocks, each block is tokenized into
//! field names, and every field is read as text, a date or a coordinate
//! depending on its configured class. The resulting candidates are checked by
//! the [`infobox_reconciler::Reconciler`] against the record's stored claims.
//!
//! # Architecture
//!
//! ```text
//! Article → find_infoboxes → Tokenizer → ValueExtractor ─┬→ normalize_date
//!                                                        └→ calc_coordinate
//!         → Importer → Reconciler (ClaimStore, EntityLabelLookup) → ImportPlan
//! ```
//!
//! # Example Usage
//!
//! ```
//! use infobox_domain::{ClaimStore, EntityId, EntityLabel, EntityLabelLookup};
//! use infobox_domain::{LookupError, StoredClaim};
//! use infobox_extractor::{ImportConfig, ImportRequest, Importer};
//!
//! struct EmptyStore;
//!
//! impl ClaimStore for EmptyStore {
//!     type Error = std::convert::Infallible;
//!
//!     fn existing_claims(&self, _entity: &EntityId) -> Result<Vec<StoredClaim>, Self::Error> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! struct NoLabels;
//!
//! impl EntityLabelLookup for NoLabels {
//!     fn lookup(&self, id: &EntityId) -> Result<EntityLabel, LookupError> {
//!         Err(LookupError::NotFound(id.clone()))
//!     }
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let importer = Importer::new(EmptyStore, NoLabels, ImportConfig::historic_places())?;
//!
//! let article = "{{Infobox NRHP\n| name = Old Mill\n| built = 1850\n}}\nThe mill...";
//! let request = ImportRequest::new(article, EntityId::parse("Q42")?);
//! let plan = importer.plan(&request)?;
//!
//! assert_eq!(plan.proposals.len(), 1);
//! println!("{} to write, {} skipped", plan.proposals.len(), plan.skipped.len());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod coordinate;
mod date;
mod error;
mod extract;
mod importer;
mod infobox;
mod tokenizer;
mod types;


pub use config::{
    CoordinateFields, FieldMapping, ImportConfig, TokenizerOptions, IMPORTED_FROM, MEDIA_LEGEND,
    POINT_IN_TIME, REFERENCE_URL, SIGNIFICANT_EVENT,
};
pub use coordinate::{calc_coordinate, precision_for};
pub use date::{check_not_future, normalize_date, resolve_month};
pub use error::{CoordinateError, DateError, ExtractError, FutureDate, ImportError};
pub use extract::{extract, FieldFailure, FieldValue, InfoboxRecord, ValueExtractor};
pub use importer::Importer;
pub use infobox::find_infoboxes;
pub use tokenizer::{tokenize, Tokenizer};
pub use types::{
    ImportPlan, ImportRequest, PlanMetadata, ProposedClaim, ProposedTarget, Reference,
    RejectedCandidate, Rejection, SkippedCandidate, SourceRevision,
};
