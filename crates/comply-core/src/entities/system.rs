use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Criticality;

/// An internal IT system that obligations apply to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct System {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub criticality: Criticality,
    pub created_at: DateTime<Utc>,
}
