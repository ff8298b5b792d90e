use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An external regulation tracked by one organization (e.g. GDPR, DORA).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Regulation {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    /// Unique within the organization, never globally.
    pub slug: String,
    pub framework: Option<String>,
    pub full_title: Option<String>,
    pub created_at: DateTime<Utc>,
}
