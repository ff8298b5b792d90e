use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::audit_diff::AuditDiff;
use crate::enums::{AuditAction, EntityType};

/// An append-only audit log entry recording one mutation.
///
/// `entity_id` is a plain reference, not a foreign key: the entry outlives the
/// row it describes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: String,
    pub organization_id: String,
    pub actor_user_id: Option<String>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub diff: AuditDiff,
    pub created_at: DateTime<Utc>,
}
