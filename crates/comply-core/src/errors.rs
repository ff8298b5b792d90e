//! Cross-cutting error types for Comply.
//!
//! Storage errors (`DatabaseError`) and client errors (`MutationError`) live in
//! their respective crates. `CoreError` covers failures that can be detected
//! without touching the store, such as parsing an unknown status value.

use thiserror::Error;

/// Errors that can be raised by any Comply crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result within the caller's organization.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A status value outside the enumerated set.
    #[error("Invalid status '{value}': expected one of {expected}")]
    InvalidStatus { value: String, expected: String },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
