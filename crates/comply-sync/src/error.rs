//! Mutation error types for comply-sync.

use thiserror::Error;

/// Outcome of a failed optimistic mutation.
#[derive(Debug, Error)]
pub enum MutationError<E> {
    /// Another mutation on the same view has not settled yet.
    #[error("A change to this view is already in progress")]
    InFlight,

    /// The request failed and the view was restored to its pre-mutation state.
    #[error("Change reverted, no changes applied: {0}")]
    RolledBack(#[source] E),

    /// The request succeeded but the view could not be refetched. The view
    /// keeps the locally applied change until the next refresh.
    #[error("Change saved but the view could not be refreshed: {0}")]
    Refresh(#[source] E),
}

impl<E> MutationError<E> {
    /// True when nothing was persisted and the local view matches the
    /// pre-mutation state.
    #[must_use]
    pub const fn is_reverted(&self) -> bool {
        matches!(self, Self::InFlight | Self::RolledBack(_))
    }

    /// The underlying source error, if any.
    #[must_use]
    pub const fn source_error(&self) -> Option<&E> {
        match self {
            Self::InFlight => None,
            Self::RolledBack(e) | Self::Refresh(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("server unavailable")]
    struct Unavailable;

    #[test]
    fn rolled_back_message_says_nothing_applied() {
        let err = MutationError::RolledBack(Unavailable);
        assert_eq!(
            err.to_string(),
            "Change reverted, no changes applied: server unavailable"
        );
        assert!(err.is_reverted());
        assert!(err.source_error().is_some());
    }

    #[test]
    fn refresh_failure_is_not_a_revert() {
        let err = MutationError::Refresh(Unavailable);
        assert!(!err.is_reverted());
        assert!(!MutationError::<Unavailable>::InFlight.to_string().is_empty());
    }
}
