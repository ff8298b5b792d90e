//! Audit log repository.
//!
//! Read side of the append-only audit log: tenant-scoped, newest-first pages
//! ordered by insert sequence, per-entity history, and state reconstruction
//! by replaying diffs.

use serde::Serialize;

use comply_core::audit_diff::AuditDiff;
use comply_core::entities::AuditLogEntry;
use comply_core::enums::{AuditAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::ComplyService;

const SELECT_COLS: &str =
    "id, organization_id, actor_user_id, action, entity_type, entity_id, diff, created_at";

/// Filter and page for [`ComplyService::get_audit_log`].
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    /// Defaults to `audit.default_page_size`, clamped to `audit.max_page_size`.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// One page of audit entries plus the number of entries matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: u64,
}

/// An entity's state rebuilt from its audit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconstruction {
    /// Last `after` snapshot, or `None` if the history ends in a deletion.
    pub state: Option<serde_json::Value>,
    pub entries: usize,
    /// Entries whose `before` did not match the state replayed so far, e.g.
    /// because an earlier entry failed to persist.
    pub discontinuities: usize,
}

pub(crate) fn row_to_audit_entry(row: &libsql::Row) -> Result<AuditLogEntry, DatabaseError> {
    let diff: AuditDiff = serde_json::from_str(&row.get::<String>(6)?)
        .map_err(|e| DatabaseError::Query(format!("Invalid audit diff JSON: {e}")))?;
    Ok(AuditLogEntry {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        actor_user_id: get_opt_string(row, 2)?,
        action: parse_enum(&row.get::<String>(3)?)?,
        entity_type: parse_enum(&row.get::<String>(4)?)?,
        entity_id: row.get(5)?,
        diff,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Build the tenant-scoped WHERE clause for an audit query.
fn audit_conditions(organization_id: &str, query: &AuditQuery) -> (String, Vec<libsql::Value>) {
    let mut conditions = vec!["organization_id = ?1".to_string()];
    let mut params: Vec<libsql::Value> = vec![organization_id.into()];

    if let Some(entity_type) = query.entity_type {
        params.push(libsql::Value::Text(entity_type.as_str().to_string()));
        conditions.push(format!("entity_type = ?{}", params.len()));
    }
    if let Some(ref entity_id) = query.entity_id {
        params.push(libsql::Value::Text(entity_id.clone()));
        conditions.push(format!("entity_id = ?{}", params.len()));
    }
    if let Some(action) = query.action {
        params.push(libsql::Value::Text(action.as_str().to_string()));
        conditions.push(format!("action = ?{}", params.len()));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

impl ComplyService {
    /// One page of a tenant's audit log, newest first.
    ///
    /// Ordering is by insert sequence, so consecutive pages never overlap even
    /// when entries share a timestamp.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_audit_log(
        &self,
        organization_id: &str,
        query: &AuditQuery,
    ) -> Result<AuditPage, DatabaseError> {
        let (where_clause, params) = audit_conditions(organization_id, query);
        let limit = self.audit_config().effective_limit(query.limit);
        let offset = query.offset;

        let conn = self.db().lock().await;

        let mut rows = conn
            .query(
                &format!("SELECT COUNT(*) FROM audit_log {where_clause}"),
                libsql::params_from_iter(params.clone()),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let total = u64::try_from(row.get::<i64>(0)?)
            .map_err(|e| DatabaseError::InvalidState(format!("negative count: {e}")))?;
        drop(rows);

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_log {where_clause}
                     ORDER BY seq DESC LIMIT {limit} OFFSET {offset}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit_entry(&row)?);
        }

        Ok(AuditPage { entries, total })
    }

    /// Every audit entry for one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn audit_history(
        &self,
        organization_id: &str,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let conn = self.db().lock().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_log
                     WHERE organization_id = ?1 AND entity_type = ?2 AND entity_id = ?3
                     ORDER BY seq"
                ),
                [organization_id, entity_type.as_str(), entity_id],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit_entry(&row)?);
        }
        Ok(entries)
    }

    /// The whole tenant audit log, oldest first.
    pub(crate) async fn full_audit_log(
        &self,
        organization_id: &str,
    ) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let conn = self.db().lock().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_log WHERE organization_id = ?1 ORDER BY seq"
                ),
                [organization_id],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit_entry(&row)?);
        }
        Ok(entries)
    }

    /// Rebuild an entity's last known state by replaying its audit diffs.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the entity has no audit history in
    /// the organization.
    pub async fn reconstruct(
        &self,
        organization_id: &str,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Reconstruction, DatabaseError> {
        let history = self
            .audit_history(organization_id, entity_type, entity_id)
            .await?;
        if history.is_empty() {
            return Err(DatabaseError::not_found(entity_type.as_str(), entity_id));
        }

        let mut state: Option<serde_json::Value> = None;
        let mut discontinuities = 0;
        for (i, entry) in history.iter().enumerate() {
            if i > 0 && entry.diff.before != state {
                discontinuities += 1;
            }
            state.clone_from(&entry.diff.after);
        }

        if discontinuities > 0 {
            tracing::warn!(
                organization_id,
                entity_type = %entity_type,
                entity_id,
                discontinuities,
                "audit history has gaps"
            );
        }

        Ok(Reconstruction {
            state,
            entries: history.len(),
            discontinuities,
        })
    }
}
