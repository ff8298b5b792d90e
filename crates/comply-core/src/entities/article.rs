use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A numbered article of a regulation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub organization_id: String,
    pub regulation_id: String,
    pub article_number: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}
