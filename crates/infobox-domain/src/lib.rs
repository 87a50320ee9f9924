//! Infobox Domain Layer
//!
//! This crate contains the value objects and collaborator interfaces shared by
//! every other infobox crate. It holds no I/O and no mutable state; the only
//! external dependency is `serde`, so configuration files and claim snapshots
//! can carry domain values directly.
//!
//! ## Key Concepts
//!
//! - **Markup block**: one infobox-like template invocation (`|name=value` fields)
//! - **Extracted value**: a typed candidate read from a block (text, text list,
//!   partial date, coordinate)
//! - **Stored claim**: a property/value assertion already present in the
//!   knowledge base, with its qualifiers
//! - **Property class**: the value type of a property, which picks the
//!   normalizer and the equivalence rule
//!
//! ## Architecture
//!
//! - Pure value objects only
//! - Knowledge-base access is expressed as traits ([`traits::ClaimStore`],
//!   [`traits::EntityLabelLookup`]) implemented in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod coordinate;
pub mod date;
pub mod ids;
pub mod locale;
pub mod policy;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use claim::{ClaimTarget, PropertyClass, Qualifier, StoredClaim};
pub use coordinate::{Coordinate, InvalidCoordinate};
pub use date::{DatePrecision, InvalidDate, PartialDate};
pub use ids::{EntityId, InvalidId, PropertyId};
pub use locale::Locale;
pub use policy::ConflictPolicy;
pub use traits::{ClaimStore, EntityLabel, EntityLabelLookup, LookupError};
pub use value::{ExtractedValue, MarkupBlock, PropertyToken};
