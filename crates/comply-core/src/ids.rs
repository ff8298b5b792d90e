//! ID prefix constants.
//!
//! IDs are generated by the store as `{prefix}-{8 hex chars}`, e.g. `obl-a3f8b2c1`.

pub const PREFIX_ORGANIZATION: &str = "org";
pub const PREFIX_REGULATION: &str = "reg";
pub const PREFIX_ARTICLE: &str = "art";
pub const PREFIX_OBLIGATION: &str = "obl";
pub const PREFIX_SYSTEM: &str = "sys";
pub const PREFIX_MAPPING: &str = "map";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for exhaustive ID generation tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_ORGANIZATION,
    PREFIX_REGULATION,
    PREFIX_ARTICLE,
    PREFIX_OBLIGATION,
    PREFIX_SYSTEM,
    PREFIX_MAPPING,
    PREFIX_AUDIT,
];
