//! Three-phase optimistic cache.
//!
//! `mutate` snapshots the cached state and applies the caller's local change
//! before the round-trip. On failure the snapshot is restored. Whatever the
//! outcome, the mutation settles by refetching from the [`ViewSource`]; if
//! that fetch fails the view is marked stale until the next good refresh.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::error::MutationError;

/// Authoritative source a cached view is refreshed from.
pub trait ViewSource {
    type State: Clone;
    type Error: std::error::Error;

    fn fetch(&self) -> impl Future<Output = Result<Self::State, Self::Error>>;
}

/// Cached view with at most one in-flight optimistic mutation.
pub struct OptimisticCache<V: ViewSource> {
    source: V,
    state: RwLock<V::State>,
    pending: AtomicBool,
    stale: AtomicBool,
}

/// Clears the pending flag on drop, so settle runs on every exit path.
struct Settle<'a>(&'a AtomicBool);

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        tracing::debug!("mutation settled");
    }
}

impl<V: ViewSource> OptimisticCache<V> {
    /// Fetch the initial state from `source`.
    ///
    /// # Errors
    ///
    /// Returns the source error if the first fetch fails.
    pub async fn load(source: V) -> Result<Self, V::Error> {
        let state = source.fetch().await?;
        Ok(Self::with_state(source, state))
    }

    pub fn with_state(source: V, state: V::State) -> Self {
        Self {
            source,
            state: RwLock::new(state),
            pending: AtomicBool::new(false),
            stale: AtomicBool::new(false),
        }
    }

    pub const fn source(&self) -> &V {
        &self.source
    }

    /// True while a mutation is between apply and settle.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// True when the last reconciliation fetch failed, so the cached state may
    /// lag the source.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Clone of the current cached state.
    pub async fn snapshot(&self) -> V::State {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&V::State) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Replace the cached state with a fresh fetch.
    ///
    /// # Errors
    ///
    /// Returns the source error; the cached state is left untouched.
    pub async fn refresh(&self) -> Result<(), V::Error> {
        self.reconcile().await
    }

    /// Run one optimistic mutation.
    ///
    /// `apply` changes the cached state immediately. `request` performs the
    /// authoritative change. On failure the exact pre-mutation snapshot is
    /// restored first. Both outcomes then reconcile with a refetch; when that
    /// fetch fails the restored (or optimistic) state is kept and the view is
    /// marked stale.
    ///
    /// # Errors
    ///
    /// - `MutationError::InFlight` if another mutation has not settled. Nothing
    ///   is applied.
    /// - `MutationError::RolledBack` if the request failed, whether or not the
    ///   reconciliation fetch succeeded.
    /// - `MutationError::Refresh` if the request succeeded but the refetch
    ///   failed.
    pub async fn mutate<T, A, R, Fut>(
        &self,
        apply: A,
        request: R,
    ) -> Result<T, MutationError<V::Error>>
    where
        A: FnOnce(&mut V::State),
        R: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, V::Error>>,
    {
        let _settle = self.begin()?;

        let snapshot = {
            let mut state = self.state.write().await;
            let snapshot = state.clone();
            apply(&mut state);
            snapshot
        };

        match request().await {
            Ok(value) => match self.reconcile().await {
                Ok(()) => Ok(value),
                Err(e) => {
                    tracing::warn!(error = %e, "change saved but view refresh failed");
                    Err(MutationError::Refresh(e))
                }
            },
            Err(e) => {
                *self.state.write().await = snapshot;
                tracing::warn!(error = %e, "change reverted, no changes applied");
                if let Err(refetch) = self.reconcile().await {
                    tracing::warn!(error = %refetch, "view refresh after revert failed");
                }
                Err(MutationError::RolledBack(e))
            }
        }
    }

    /// Replace the state with a fresh fetch, or mark the view stale.
    async fn reconcile(&self) -> Result<(), V::Error> {
        match self.source.fetch().await {
            Ok(fresh) => {
                *self.state.write().await = fresh;
                self.stale.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.stale.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    fn begin(&self) -> Result<Settle<'_>, MutationError<V::Error>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MutationError::InFlight)?;
        Ok(Settle(&self.pending))
    }
}
