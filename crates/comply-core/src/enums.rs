//! Status enums, classification levels, entity types, and audit actions.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ObligationStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an obligation.
///
/// The set is unordered: every state may move to every state, including
/// itself. A `verified` obligation can fall back to `in_progress` when its
/// evidence is withdrawn.
///
/// ```text
/// not_started ⇄ in_progress ⇄ implemented ⇄ under_review ⇄ verified
///      (any state → any state)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    NotStarted,
    InProgress,
    Implemented,
    UnderReview,
    Verified,
}

impl ObligationStatus {
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Implemented,
        Self::UnderReview,
        Self::Verified,
    ];

    /// Status assigned on creation.
    pub const INITIAL: Self = Self::NotStarted;

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        &Self::ALL
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Implemented => "implemented",
            Self::UnderReview => "under_review",
            Self::Verified => "verified",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ObligationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus {
                value: s.to_string(),
                expected: Self::expected(),
            })
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Risk carried by an unmet obligation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "unknown risk level '{other}': expected low, medium, high or critical"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Criticality
// ---------------------------------------------------------------------------

/// Business criticality of a system in scope of an obligation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Criticality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criticality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "unknown criticality '{other}': expected low, medium, high or critical"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    Mapped,
    Unmapped,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::Mapped => "mapped",
            Self::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity referenced by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Organization,
    Regulation,
    Article,
    Obligation,
    System,
    ObligationSystemMapping,
}

impl EntityType {
    pub const ALL: [Self; 6] = [
        Self::Organization,
        Self::Regulation,
        Self::Article,
        Self::Obligation,
        Self::System,
        Self::ObligationSystemMapping,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Regulation => "regulation",
            Self::Article => "article",
            Self::Obligation => "obligation",
            Self::System => "system",
            Self::ObligationSystemMapping => "obligation_system_mapping",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        status_not_started,
        ObligationStatus,
        ObligationStatus::NotStarted,
        "not_started"
    );
    test_serde_roundtrip!(
        status_under_review,
        ObligationStatus,
        ObligationStatus::UnderReview,
        "under_review"
    );
    test_serde_roundtrip!(risk_critical, RiskLevel, RiskLevel::Critical, "critical");
    test_serde_roundtrip!(
        audit_status_changed,
        AuditAction,
        AuditAction::StatusChanged,
        "status_changed"
    );
    test_serde_roundtrip!(
        entity_type_mapping,
        EntityType,
        EntityType::ObligationSystemMapping,
        "obligation_system_mapping"
    );

    #[test]
    fn every_status_reaches_every_status() {
        for from in ObligationStatus::ALL {
            for to in ObligationStatus::ALL {
                assert!(from.can_transition_to(to), "{from} -> {to} should be allowed");
            }
        }
    }

    #[test]
    fn verified_can_fall_back() {
        assert!(ObligationStatus::Verified.can_transition_to(ObligationStatus::InProgress));
    }

    #[test]
    fn initial_status_is_not_started() {
        assert_eq!(ObligationStatus::INITIAL, ObligationStatus::NotStarted);
    }

    #[rstest]
    #[case("not_started", ObligationStatus::NotStarted)]
    #[case("in_progress", ObligationStatus::InProgress)]
    #[case("implemented", ObligationStatus::Implemented)]
    #[case("under_review", ObligationStatus::UnderReview)]
    #[case("verified", ObligationStatus::Verified)]
    fn parses_known_status(#[case] input: &str, #[case] expected: ObligationStatus) {
        assert_eq!(input.parse::<ObligationStatus>().unwrap(), expected);
    }

    #[rstest]
    #[case("done")]
    #[case("Verified")]
    #[case("")]
    #[case("in progress")]
    fn rejects_unknown_status(#[case] input: &str) {
        let err = input.parse::<ObligationStatus>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus { ref value, .. } if value == input));
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", ObligationStatus::InProgress), "in_progress");
        assert_eq!(format!("{}", RiskLevel::High), "high");
        assert_eq!(format!("{}", Criticality::Low), "low");
        assert_eq!(format!("{}", AuditAction::Unmapped), "unmapped");
        assert_eq!(format!("{}", EntityType::Regulation), "regulation");
    }

    #[test]
    fn classification_levels_parse() {
        assert_eq!("critical".parse::<RiskLevel>().unwrap(), RiskLevel::Critical);
        assert_eq!("low".parse::<Criticality>().unwrap(), Criticality::Low);
        assert!(matches!(
            "severe".parse::<RiskLevel>(),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(Criticality::default(), Criticality::Medium);
    }
}
