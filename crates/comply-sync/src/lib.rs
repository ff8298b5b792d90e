//! # comply-sync
//!
//! Client-visible optimistic mutations over an authoritative view.
//!
//! A view is cached locally and changed immediately when a mutation starts.
//! When the round-trip succeeds the cache is refetched from the source and the
//! local guess is discarded. When it fails the exact pre-mutation snapshot is
//! restored. Only one mutation may be in flight per view.

pub mod board;
pub mod cache;
pub mod error;

pub use board::ObligationBoard;
pub use cache::{OptimisticCache, ViewSource};
pub use error::MutationError;
