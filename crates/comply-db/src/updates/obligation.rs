//! Obligation update builder.

use chrono::NaiveDate;
use serde::Serialize;

use comply_core::enums::RiskLevel;

/// Field changes for an obligation. Status is excluded: it only moves through
/// the transition operations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObligationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl ObligationUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.risk_level.is_none()
            && self.owner_id.is_none()
            && self.due_date.is_none()
    }
}

pub struct ObligationUpdateBuilder(ObligationUpdate);

impl ObligationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ObligationUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: Option<String>) -> Self {
        self.0.summary = Some(summary);
        self
    }

    #[must_use]
    pub const fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.0.risk_level = Some(risk_level);
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: Option<String>) -> Self {
        self.0.owner_id = Some(owner_id);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn build(self) -> ObligationUpdate {
        self.0
    }
}

impl Default for ObligationUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_changed_fields_only() {
        let update = ObligationUpdateBuilder::new()
            .risk_level(RiskLevel::High)
            .owner_id(None)
            .build();
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"risk_level": "high", "owner_id": null})
        );
    }

    #[test]
    fn default_is_empty() {
        assert!(ObligationUpdateBuilder::default().build().is_empty());
    }
}
