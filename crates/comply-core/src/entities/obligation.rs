use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ObligationStatus, RiskLevel};

/// A tracked compliance requirement derived from an article.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Obligation {
    pub id: String,
    pub organization_id: String,
    pub article_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub status: ObligationStatus,
    pub risk_level: RiskLevel,
    pub owner_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
