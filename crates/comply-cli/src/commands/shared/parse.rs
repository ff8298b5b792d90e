use serde::de::DeserializeOwned;

/// Parse a `snake_case` enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// [`parse_enum`] for an optional flag.
pub fn parse_opt_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|raw| parse_enum(raw, field)).transpose()
}

#[cfg(test)]
mod tests {
    use comply_core::enums::{AuditAction, EntityType, ObligationStatus, RiskLevel};

    use super::{parse_enum, parse_opt_enum};

    #[test]
    fn parses_snake_case_enum() {
        let status: ObligationStatus =
            parse_enum("under_review", "status").expect("status should parse");
        assert_eq!(status, ObligationStatus::UnderReview);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let action: AuditAction =
            parse_enum("status-changed", "action").expect("action should parse");
        assert_eq!(action, AuditAction::StatusChanged);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<RiskLevel>("severe", "risk level").expect_err("should fail");
        assert!(err.to_string().contains("invalid risk level 'severe'"));
    }

    #[test]
    fn optional_absent_is_none() {
        let parsed: Option<EntityType> = parse_opt_enum(None, "entity type").unwrap();
        assert!(parsed.is_none());
        let parsed: Option<EntityType> = parse_opt_enum(Some("obligation"), "entity type").unwrap();
        assert_eq!(parsed, Some(EntityType::Obligation));
    }
}
