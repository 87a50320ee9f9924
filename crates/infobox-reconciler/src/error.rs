//! Reconciler error types

use infobox_domain::{PropertyClass, PropertyId};
use thiserror::Error;

/// Errors that can occur during reconciliation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// The property has no class in the configuration
    #[error("No property class configured for {0}")]
    UnknownProperty(PropertyId),

    /// The candidate's shape cannot be compared under the property's class
    #[error("A {kind} candidate cannot be compared as {class}")]
    ClassMismatch {
        /// Configured class of the property
        class: PropertyClass,
        /// Kind of the candidate value
        kind: &'static str,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
