//! Service layer orchestrating tenant-scoped mutations with audit dispatch.
//!
//! `ComplyService` wraps `ComplyDb` (raw database access) and the
//! `AuditDispatcher`. All repo methods are implemented as `impl ComplyService`.

use std::future::Future;

use serde::Serialize;

use comply_config::{AuditConfig, ComplyConfig};
use comply_core::audit_diff::AuditDiff;
use comply_core::context::RequestContext;
use comply_core::entities::AuditLogEntry;
use comply_core::enums::{AuditAction, EntityType};

use crate::ComplyDb;
use crate::audit::{AuditDispatcher, AuditFailureHook, AuditRecord, AuditStats};
use crate::error::DatabaseError;

/// Outcome of an audited mutation: the snapshots to record and the value to
/// hand back to the caller.
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub result: T,
}

impl<T> Mutation<T> {
    #[must_use]
    pub const fn new(
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
        result: T,
    ) -> Self {
        Self {
            before,
            after,
            result,
        }
    }

    /// Build from typed entity snapshots.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a snapshot fails to serialize.
    pub fn snapshots<B: Serialize, A: Serialize>(
        before: Option<&B>,
        after: Option<&A>,
        result: T,
    ) -> Result<Self, DatabaseError> {
        let diff = AuditDiff::between(before, after)?;
        Ok(Self::new(diff.before, diff.after, result))
    }

    /// Snapshot of a newly inserted entity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the snapshot fails to serialize.
    pub fn created<E: Serialize>(after: &E, result: T) -> Result<Self, DatabaseError> {
        Self::snapshots::<E, E>(None, Some(after), result)
    }

    /// Snapshots of an entity before and after a change.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a snapshot fails to serialize.
    pub fn changed<E: Serialize>(before: &E, after: &E, result: T) -> Result<Self, DatabaseError> {
        Self::snapshots(Some(before), Some(after), result)
    }

    /// Snapshot of an entity that no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the snapshot fails to serialize.
    pub fn deleted<E: Serialize>(before: &E, result: T) -> Result<Self, DatabaseError> {
        Self::snapshots::<E, E>(Some(before), None, result)
    }
}

/// Orchestrates database mutations with audit dispatch.
///
/// Every mutation method follows this protocol:
/// 1. Take the store lock and begin a transaction
/// 2. Execute SQL (constraint violations abort here, nothing is audited)
/// 3. Dispatch the audit entry inside the transaction under a savepoint
/// 4. Commit
pub struct ComplyService {
    db: ComplyDb,
    audit: AuditDispatcher,
    audit_config: AuditConfig,
}

impl ComplyService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `audit_config` - Page size limits for audit log retrieval.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, audit_config: AuditConfig) -> Result<Self, DatabaseError> {
        let db = ComplyDb::open_local(db_path).await?;
        Ok(Self::from_db(db, audit_config))
    }

    /// Create a service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the configured database cannot be opened.
    pub async fn from_config(config: &ComplyConfig) -> Result<Self, DatabaseError> {
        Self::new_local(&config.database.path, config.audit.clone()).await
    }

    /// Create from an existing `ComplyDb` (for testing).
    #[must_use]
    pub fn from_db(db: ComplyDb, audit_config: AuditConfig) -> Self {
        Self {
            db,
            audit: AuditDispatcher::new(),
            audit_config,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ComplyDb {
        &self.db
    }

    #[must_use]
    pub const fn audit_config(&self) -> &AuditConfig {
        &self.audit_config
    }

    pub(crate) const fn audit(&self) -> &AuditDispatcher {
        &self.audit
    }

    /// Written, skipped, and failed audit counts since startup.
    #[must_use]
    pub fn audit_stats(&self) -> AuditStats {
        self.audit.stats()
    }

    /// Register a callback for audit write failures.
    pub fn on_audit_failure(&mut self, hook: AuditFailureHook) {
        self.audit.add_hook(hook);
    }

    /// Run `f` inside one transaction. Commits on `Ok`, rolls back on `Err`.
    ///
    /// `f` receives a handle to the transaction's connection. It must use the
    /// free `fetch_*` functions rather than `ComplyService` methods, which
    /// would wait on the lock this transaction holds.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or `DatabaseError` if the transaction
    /// cannot begin or commit.
    pub async fn in_write_tx<T, F, Fut>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(libsql::Connection) -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        let tx = self.db.begin_write().await?;
        let result = f(tx.connection()).await;
        tx.finish(result).await
    }

    /// Execute an audited mutation of `organization_id` as one unit.
    ///
    /// If `f` fails the transaction is rolled back and no audit entry is
    /// written. If `f` succeeds its `before`/`after` snapshots are dispatched
    /// as one audit entry, the transaction commits, and `result` is returned
    /// unchanged. An audit write failure never fails the call.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::TenantMismatch` before touching the store if
    /// `ctx` is scoped to another organization. Otherwise returns the error
    /// from `f`, or `DatabaseError` if the transaction cannot begin or commit.
    pub async fn with_audit<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        f: F,
    ) -> Result<T, DatabaseError>
    where
        F: FnOnce(libsql::Connection) -> Fut,
        Fut: Future<Output = Result<Mutation<T>, DatabaseError>>,
    {
        ensure_tenant(ctx, organization_id)?;
        let tx = self.db.begin_write().await?;
        let mutation = match f(tx.connection()).await {
            Ok(mutation) => mutation,
            Err(e) => return tx.finish(Err(e)).await,
        };

        let record = AuditRecord::new(
            action,
            entity_type,
            entity_id,
            AuditDiff::new(mutation.before, mutation.after),
        );
        self.audit.dispatch(&tx, ctx, &record).await;
        tx.commit().await?;
        Ok(mutation.result)
    }

    /// Persist one audit entry outside any business mutation.
    ///
    /// Best-effort like every other audit write: returns `Ok(None)` when the
    /// context has no active organization or the insert fails. Failures are
    /// logged, counted, and passed to the failure hooks.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only if the transaction cannot begin or commit.
    pub async fn record_audit(
        &self,
        ctx: &RequestContext,
        record: AuditRecord,
    ) -> Result<Option<AuditLogEntry>, DatabaseError> {
        let tx = self.db.begin_write().await?;
        let entry = self.audit.dispatch(&tx, ctx, &record).await;
        tx.commit().await?;
        Ok(entry)
    }
}

/// Reject a context scoped to an organization other than the one being mutated.
///
/// A context without an active organization passes. Its audit entries are
/// skipped downstream.
///
/// # Errors
///
/// Returns `DatabaseError::TenantMismatch` when the two organizations differ.
pub fn ensure_tenant(ctx: &RequestContext, organization_id: &str) -> Result<(), DatabaseError> {
    match ctx.organization_id() {
        Some(active) if active != organization_id => Err(DatabaseError::TenantMismatch {
            active: active.to_string(),
            requested: organization_id.to_string(),
        }),
        _ => Ok(()),
    }
}
