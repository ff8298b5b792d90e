//! Before/after diff envelope stored with every audit entry.
//!
//! `before == None` marks a creation, `after == None` a deletion. Both present
//! is an update or a status change (possibly with identical sides when an
//! actor re-confirms a status).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Snapshot pair persisted as the audit entry's `diff` column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditDiff {
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

/// Kind of change a diff represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Create,
    Update,
    Delete,
    Empty,
}

impl AuditDiff {
    #[must_use]
    pub const fn new(before: Option<serde_json::Value>, after: Option<serde_json::Value>) -> Self {
        Self { before, after }
    }

    /// Build a diff from two optional entity snapshots.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if either snapshot fails to serialize.
    pub fn between<B: Serialize, A: Serialize>(
        before: Option<&B>,
        after: Option<&A>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            before: before.map(serde_json::to_value).transpose().map_err(anyhow::Error::from)?,
            after: after.map(serde_json::to_value).transpose().map_err(anyhow::Error::from)?,
        })
    }

    /// Diff for a newly created entity.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if the snapshot fails to serialize.
    pub fn created<T: Serialize>(after: &T) -> Result<Self, CoreError> {
        Self::between::<T, T>(None, Some(after))
    }

    /// Diff for a deleted entity.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if the snapshot fails to serialize.
    pub fn deleted<T: Serialize>(before: &T) -> Result<Self, CoreError> {
        Self::between::<T, T>(Some(before), None)
    }

    #[must_use]
    pub const fn kind(&self) -> DiffKind {
        match (&self.before, &self.after) {
            (None, Some(_)) => DiffKind::Create,
            (Some(_), Some(_)) => DiffKind::Update,
            (Some(_), None) => DiffKind::Delete,
            (None, None) => DiffKind::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn created_has_no_before() {
        let diff = AuditDiff::created(&json!({"status": "not_started"})).unwrap();
        assert_eq!(diff.kind(), DiffKind::Create);
        assert_eq!(diff.before, None);
    }

    #[test]
    fn deleted_has_no_after() {
        let diff = AuditDiff::deleted(&json!({"slug": "gdpr"})).unwrap();
        assert_eq!(diff.kind(), DiffKind::Delete);
        assert_eq!(diff.after, None);
    }

    #[test]
    fn nulls_serialize_explicitly() {
        let diff = AuditDiff::created(&json!({"a": 1})).unwrap();
        let value = serde_json::to_value(&diff).unwrap();
        assert_eq!(value, json!({"before": null, "after": {"a": 1}}));
    }
}
