use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Many-to-many link between an obligation and a system of the same organization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ObligationSystemMapping {
    pub id: String,
    pub organization_id: String,
    pub obligation_id: String,
    pub system_id: String,
    pub created_at: DateTime<Utc>,
}
