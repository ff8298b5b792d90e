//! Audit log retrieval configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_page_size() -> u32 {
    50
}

const fn default_max_page_size() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Page size used when a caller does not pass a limit.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound applied to any requested limit.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl AuditConfig {
    /// Resolve a caller-supplied limit against the configured defaults.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    /// Check that the page sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a page size is zero or the default
    /// exceeds the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit.max_page_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidValue {
                field: "audit.default_page_size".into(),
                reason: format!("must be between 1 and {}", self.max_page_size),
            });
        }
        Ok(())
    }
}
