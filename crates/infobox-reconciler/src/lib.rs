//! Infobox Reconciler
//!
//! Decides, for each typed candidate read from an infobox, whether the
//! knowledge base already holds it.
//!
//! The Reconciler provides:
//! - First-claim-wins handling for single-valued properties
//! - One equivalence rule per property class
//! - Duplicate detection among qualifiers of every stored claim
//! - A caller-supplied conflict policy for non-duplicate values
//!
//! # Examples
//!
//! ```
//! use infobox_domain::{EntityId, EntityLabel, EntityLabelLookup, ExtractedValue, LookupError};
//! use infobox_domain::{PropertyClass, PropertyId};
//! use infobox_reconciler::{Decision, ReconcileConfig, Reconciler};
//!
//! struct NoLabels;
//!
//! impl EntityLabelLookup for NoLabels {
//!     fn lookup(&self, id: &EntityId) -> Result<EntityLabel, LookupError> {
//!         Err(LookupError::NotFound(id.clone()))
//!     }
//! }
//!
//! let image = PropertyId::parse("P18").unwrap();
//! let config = ReconcileConfig::new().with_class(image.clone(), PropertyClass::MediaReference);
//! let reconciler = Reconciler::new(config);
//!
//! let candidate = ExtractedValue::PlainText("Example.jpg".into());
//! let decision = reconciler.reconcile(&image, &candidate, &[], &NoLabels).unwrap();
//! assert!(decision.is_propose());
//! ```

#![warn(missing_docs)]

mod config;
mod equivalence;
mod error;
mod reconciler;

pub use config::ReconcileConfig;
pub use equivalence::{matches, normalize_label, normalize_media, parse_amount, strip_link};
pub use error::ReconcileError;
pub use reconciler::{reconcile, Decision, Reconciler, SkipReason, WriteMode};
