//! Database error types for comply-db.

use thiserror::Error;

use comply_core::errors::CoreError;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A referenced parent row does not exist within the same organization.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A scoped uniqueness invariant (e.g. `(organization_id, slug)`) was violated.
    #[error("Unique constraint violation: {0}")]
    UniqueConstraintViolation(String),

    /// The id does not resolve within the caller's organization.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A batch referenced ids outside the caller's organization. Nothing was written.
    #[error("No changes applied: {entity_type} ids not found in organization: {}", .missing.join(", "))]
    BatchNotFound {
        entity_type: String,
        missing: Vec<String>,
    },

    /// The request context is scoped to a different organization than the
    /// one the operation targets. Nothing was written.
    #[error("Request is scoped to organization {active}, not {requested}")]
    TenantMismatch { active: String, requested: String },

    /// A status value outside the enumerated set.
    #[error("Invalid status '{value}': expected one of {expected}")]
    InvalidStatus { value: String, expected: String },

    /// The audit entry could not be persisted. Never returned from a business
    /// operation; surfaced through audit failure hooks instead.
    #[error("Audit write failed: {0}")]
    AuditWriteFailure(String),

    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error that is not a constraint violation.
    #[error("libSQL error: {0}")]
    LibSql(#[source] libsql::Error),

    /// Filesystem error (audit export).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// True for both single-id and batch lookups that failed to resolve.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::BatchNotFound { .. })
    }
}

/// Classify constraint failures so callers can match on them instead of
/// parsing `SQLite` messages.
impl From<libsql::Error> for DatabaseError {
    fn from(e: libsql::Error) -> Self {
        let msg = e.to_string();
        if msg.contains("FOREIGN KEY constraint failed") {
            Self::ForeignKeyViolation(msg)
        } else if msg.contains("UNIQUE constraint failed") {
            Self::UniqueConstraintViolation(msg)
        } else {
            Self::LibSql(e)
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            CoreError::InvalidStatus { value, expected } => Self::InvalidStatus { value, expected },
            CoreError::Validation(msg) => Self::InvalidState(msg),
            CoreError::Other(err) => Self::Other(err),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Other(e.into())
    }
}
