//! Audit dispatch.
//!
//! Every mutation hands an [`AuditRecord`] to the [`AuditDispatcher`] while its
//! transaction is still open. The dispatcher writes the entry under a
//! `SAVEPOINT`: if the insert fails, only the savepoint is rolled back, the
//! business change stays in the transaction, and the failure goes to the log,
//! the `failed` counter, and every registered [`AuditFailureHook`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

use comply_core::audit_diff::AuditDiff;
use comply_core::context::RequestContext;
use comply_core::entities::AuditLogEntry;
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::generate_id;

/// What happened to which entity, with its before/after snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub diff: AuditDiff,
}

impl AuditRecord {
    #[must_use]
    pub fn new(
        action: AuditAction,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        diff: AuditDiff,
    ) -> Self {
        Self {
            action,
            entity_type,
            entity_id: entity_id.into(),
            diff,
        }
    }
}

/// An audit entry that could not be persisted.
#[derive(Debug, Clone)]
pub struct AuditFailure {
    pub organization_id: Option<String>,
    pub actor_user_id: Option<String>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub error: String,
}

/// Callback invoked for every audit write failure.
pub type AuditFailureHook = Arc<dyn Fn(&AuditFailure) + Send + Sync>;

/// Counters since the dispatcher was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub written: u64,
    /// Records dropped because the context had no active organization.
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Default)]
pub struct AuditDispatcher {
    written: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    hooks: Vec<AuditFailureHook>,
}

impl AuditDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hook(&mut self, hook: AuditFailureHook) {
        self.hooks.push(hook);
    }

    #[must_use]
    pub fn stats(&self) -> AuditStats {
        AuditStats {
            written: self.written.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Write one entry and propagate any failure.
    ///
    /// Failures are still counted and reported to hooks.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::AuditWriteFailure` if the entry cannot be written.
    pub async fn record(
        &self,
        conn: &libsql::Connection,
        ctx: &RequestContext,
        record: &AuditRecord,
    ) -> Result<Option<AuditLogEntry>, DatabaseError> {
        match write_audit_entry(conn, ctx, record).await {
            Ok(Some(entry)) => {
                self.written.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry))
            }
            Ok(None) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.report_failure(ctx, record, &e);
                Err(e)
            }
        }
    }

    /// Best-effort write inside the caller's open transaction.
    ///
    /// Never fails: a failed insert is rolled back to the savepoint so the
    /// surrounding business change can still commit.
    pub async fn dispatch(
        &self,
        conn: &libsql::Connection,
        ctx: &RequestContext,
        record: &AuditRecord,
    ) -> Option<AuditLogEntry> {
        if let Err(e) = conn.execute("SAVEPOINT audit_write", ()).await {
            self.report_failure(ctx, record, &DatabaseError::AuditWriteFailure(e.to_string()));
            return None;
        }

        match self.record(conn, ctx, record).await {
            Ok(entry) => {
                if let Err(e) = conn.execute("RELEASE audit_write", ()).await {
                    tracing::error!(error = %e, "failed to release audit savepoint");
                }
                entry
            }
            Err(_) => {
                if let Err(e) = conn.execute("ROLLBACK TO audit_write", ()).await {
                    tracing::error!(error = %e, "failed to roll back audit savepoint");
                }
                if let Err(e) = conn.execute("RELEASE audit_write", ()).await {
                    tracing::error!(error = %e, "failed to release audit savepoint");
                }
                None
            }
        }
    }

    fn report_failure(&self, ctx: &RequestContext, record: &AuditRecord, error: &DatabaseError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::error!(
            organization_id = ?ctx.organization_id(),
            action = %record.action,
            entity_type = %record.entity_type,
            entity_id = %record.entity_id,
            error = %error,
            "audit write failed"
        );

        let failure = AuditFailure {
            organization_id: ctx.active_organization_id.clone(),
            actor_user_id: ctx.user_id.clone(),
            action: record.action,
            entity_type: record.entity_type,
            entity_id: record.entity_id.clone(),
            error: error.to_string(),
        };
        for hook in &self.hooks {
            hook(&failure);
        }
    }
}

/// Insert one audit entry attributed to the context's actor and organization.
///
/// Returns `Ok(None)` without writing when the context has no active
/// organization.
///
/// # Errors
///
/// Returns `DatabaseError::AuditWriteFailure` if id generation or the insert fails.
pub async fn write_audit_entry(
    conn: &libsql::Connection,
    ctx: &RequestContext,
    record: &AuditRecord,
) -> Result<Option<AuditLogEntry>, DatabaseError> {
    let Some(organization_id) = ctx.organization_id() else {
        tracing::warn!(
            action = %record.action,
            entity_type = %record.entity_type,
            entity_id = %record.entity_id,
            "no active organization in request context; audit entry skipped"
        );
        return Ok(None);
    };

    let id = generate_id(conn, PREFIX_AUDIT)
        .await
        .map_err(|e| DatabaseError::AuditWriteFailure(e.to_string()))?;
    let diff = serde_json::to_string(&record.diff)
        .map_err(|e| DatabaseError::AuditWriteFailure(e.to_string()))?;
    let now = Utc::now();

    conn.execute(
        "INSERT INTO audit_log (id, organization_id, actor_user_id, action, entity_type, entity_id, diff, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        libsql::params![
            id.as_str(),
            organization_id,
            ctx.user_id(),
            record.action.as_str(),
            record.entity_type.as_str(),
            record.entity_id.as_str(),
            diff.as_str(),
            now.to_rfc3339()
        ],
    )
    .await
    .map_err(|e| DatabaseError::AuditWriteFailure(e.to_string()))?;

    Ok(Some(AuditLogEntry {
        id,
        organization_id: organization_id.to_string(),
        actor_user_id: ctx.user_id.clone(),
        action: record.action,
        entity_type: record.entity_type,
        entity_id: record.entity_id.clone(),
        diff: record.diff.clone(),
        created_at: now,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComplyDb;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    async fn db_with_org() -> ComplyDb {
        let db = ComplyDb::open_local(":memory:").await.unwrap();
        db.conn()
            .execute(
                "INSERT INTO organizations (id, name, slug) VALUES ('org-a', 'A', 'a')",
                (),
            )
            .await
            .unwrap();
        db
    }

    async fn count(db: &ComplyDb) -> i64 {
        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM audit_log", ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }

    fn record(entity_id: &str) -> AuditRecord {
        AuditRecord::new(
            AuditAction::Updated,
            EntityType::Obligation,
            entity_id,
            AuditDiff::new(Some(json!({"a": 1})), Some(json!({"a": 2}))),
        )
    }

    #[tokio::test]
    async fn record_writes_entry() {
        let db = db_with_org().await;
        let dispatcher = AuditDispatcher::new();
        let ctx = RequestContext::new("org-a", "user_1");

        let entry = dispatcher
            .record(db.conn(), &ctx, &record("obl-1"))
            .await
            .unwrap()
            .unwrap();

        assert!(entry.id.starts_with("aud-"));
        assert_eq!(entry.actor_user_id.as_deref(), Some("user_1"));
        assert_eq!(count(&db).await, 1);
        assert_eq!(dispatcher.stats().written, 1);
    }

    #[tokio::test]
    async fn missing_org_is_skipped_and_counted() {
        let db = db_with_org().await;
        let dispatcher = AuditDispatcher::new();

        let entry = dispatcher
            .record(db.conn(), &RequestContext::default(), &record("obl-1"))
            .await
            .unwrap();

        assert!(entry.is_none());
        assert_eq!(count(&db).await, 0);
        assert_eq!(
            dispatcher.stats(),
            AuditStats {
                written: 0,
                skipped: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_surrounding_transaction() {
        let db = db_with_org().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = AuditDispatcher::new();
        let seen = Arc::clone(&calls);
        dispatcher.add_hook(Arc::new(move |failure: &AuditFailure| {
            assert_eq!(failure.entity_id, "");
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO organizations (id, name, slug) VALUES ('org-b', 'B', 'b')",
            (),
        )
        .await
        .unwrap();
        let ctx = RequestContext::system("org-a");
        // Empty entity ids violate the audit_log CHECK constraint.
        let entry = dispatcher.dispatch(&tx, &ctx, &record("")).await;
        assert!(entry.is_none());
        tx.commit().await.unwrap();

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM organizations", ())
            .await
            .unwrap();
        let orgs = rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap();
        assert_eq!(orgs, 2);
        assert_eq!(count(&db).await, 0);
        assert_eq!(dispatcher.stats().failed, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
