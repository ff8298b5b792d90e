//! Request context threaded explicitly through every mutating call.
//!
//! Produced by the surrounding API layer after authentication. The core never
//! reads actor or tenant from ambient state; it only accepts what is passed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Resolved actor and tenant for one logical request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestContext {
    /// Organization the caller is acting within. `None` when the session has
    /// not selected one; audit persistence is skipped in that case.
    pub active_organization_id: Option<String>,
    /// Acting user. `None` for system-initiated mutations.
    pub user_id: Option<String>,
}

impl RequestContext {
    /// Context for a user acting inside an organization.
    #[must_use]
    pub fn new(organization_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            active_organization_id: Some(organization_id.into()),
            user_id: Some(user_id.into()),
        }
    }

    /// Context for a background job acting inside an organization with no user.
    #[must_use]
    pub fn system(organization_id: impl Into<String>) -> Self {
        Self {
            active_organization_id: Some(organization_id.into()),
            user_id: None,
        }
    }

    #[must_use]
    pub fn organization_id(&self) -> Option<&str> {
        self.active_organization_id.as_deref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
