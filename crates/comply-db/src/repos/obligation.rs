//! Obligation repository: CRUD, field updates, and status transitions.
//!
//! Status moves only through [`ComplyService::transition_obligation`] and
//! [`ComplyService::bulk_transition_obligations`]. The bulk form validates
//! every id against the organization before writing anything, so a batch
//! either lands completely (updates and audit entries) or not at all.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use comply_core::audit_diff::AuditDiff;
use comply_core::context::RequestContext;
use comply_core::entities::Obligation;
use comply_core::enums::{AuditAction, EntityType, ObligationStatus, RiskLevel};
use comply_core::ids::PREFIX_OBLIGATION;

use crate::audit::AuditRecord;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_date, placeholders};
use crate::service::{ComplyService, Mutation, ensure_tenant};
use crate::updates::obligation::ObligationUpdate;

const SELECT_COLS: &str = "id, organization_id, article_id, title, summary, status, risk_level, \
                           owner_id, due_date, created_at, updated_at";

/// Input for [`ComplyService::create_obligation`]. New obligations always
/// start in [`ObligationStatus::INITIAL`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewObligation {
    pub title: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    pub owner_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Filter criteria for obligation listings.
#[derive(Debug, Default)]
pub struct ObligationFilter {
    pub article_id: Option<String>,
    pub status: Option<ObligationStatus>,
    pub risk_level: Option<RiskLevel>,
    pub owner_id: Option<String>,
    pub limit: Option<u32>,
}

/// Result of a single status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub obligation: Obligation,
    pub from: ObligationStatus,
    pub to: ObligationStatus,
}

/// Result of a committed bulk status change, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkTransition {
    pub updated: Vec<Obligation>,
}

fn row_to_obligation(row: &libsql::Row) -> Result<Obligation, DatabaseError> {
    Ok(Obligation {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        article_id: row.get(2)?,
        title: row.get(3)?,
        summary: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        risk_level: parse_enum(&row.get::<String>(6)?)?,
        owner_id: get_opt_string(row, 7)?,
        due_date: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

async fn collect(mut rows: libsql::Rows) -> Result<Vec<Obligation>, DatabaseError> {
    let mut obligations = Vec::new();
    while let Some(row) = rows.next().await? {
        obligations.push(row_to_obligation(&row)?);
    }
    Ok(obligations)
}

/// Fetch an obligation within one organization.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
pub async fn fetch_obligation(
    conn: &libsql::Connection,
    organization_id: &str,
    id: &str,
) -> Result<Obligation, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM obligations WHERE organization_id = ?1 AND id = ?2"
            ),
            [organization_id, id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Obligation.as_str(), id))?;
    row_to_obligation(&row)
}

/// Fetch the subset of `ids` that resolve within the organization, keyed by id.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn fetch_obligations_in(
    conn: &libsql::Connection,
    organization_id: &str,
    ids: &[&str],
) -> Result<HashMap<String, Obligation>, DatabaseError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut params: Vec<libsql::Value> = Vec::with_capacity(ids.len() + 1);
    params.push(organization_id.into());
    params.extend(ids.iter().map(|id| libsql::Value::from(*id)));
    let sql = format!(
        "SELECT {SELECT_COLS} FROM obligations WHERE organization_id = ?1 AND id IN ({})",
        placeholders(2, ids.len())
    );

    let rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    Ok(collect(rows)
        .await?
        .into_iter()
        .map(|o| (o.id.clone(), o))
        .collect())
}

/// All obligations under the articles of one regulation.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn fetch_obligations_for_regulation(
    conn: &libsql::Connection,
    organization_id: &str,
    regulation_id: &str,
) -> Result<Vec<Obligation>, DatabaseError> {
    let rows = conn
        .query(
            "SELECT o.id, o.organization_id, o.article_id, o.title, o.summary, o.status,
                    o.risk_level, o.owner_id, o.due_date, o.created_at, o.updated_at
             FROM obligations o
             JOIN articles a ON a.organization_id = o.organization_id AND a.id = o.article_id
             WHERE a.organization_id = ?1 AND a.regulation_id = ?2
             ORDER BY o.created_at, o.id",
            [organization_id, regulation_id],
        )
        .await?;
    collect(rows).await
}

/// All obligations mapped to one system.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn fetch_obligations_for_system(
    conn: &libsql::Connection,
    organization_id: &str,
    system_id: &str,
) -> Result<Vec<Obligation>, DatabaseError> {
    let rows = conn
        .query(
            "SELECT o.id, o.organization_id, o.article_id, o.title, o.summary, o.status,
                    o.risk_level, o.owner_id, o.due_date, o.created_at, o.updated_at
             FROM obligations o
             JOIN obligation_system_mappings m
               ON m.organization_id = o.organization_id AND m.obligation_id = o.id
             WHERE m.organization_id = ?1 AND m.system_id = ?2
             ORDER BY o.created_at, o.id",
            [organization_id, system_id],
        )
        .await?;
    collect(rows).await
}

/// Write a new status and return the updated row. No version check: the last
/// writer wins.
async fn set_status(
    conn: &libsql::Connection,
    current: &Obligation,
    to: ObligationStatus,
) -> Result<Obligation, DatabaseError> {
    if !current.status.can_transition_to(to) {
        return Err(DatabaseError::InvalidState(format!(
            "Cannot transition obligation {} from {} to {}",
            current.id, current.status, to
        )));
    }

    let now = Utc::now();
    conn.execute(
        "UPDATE obligations SET status = ?1, updated_at = ?2
         WHERE organization_id = ?3 AND id = ?4",
        libsql::params![
            to.as_str(),
            now.to_rfc3339(),
            current.organization_id.as_str(),
            current.id.as_str()
        ],
    )
    .await?;

    Ok(Obligation {
        status: to,
        updated_at: now,
        ..current.clone()
    })
}

/// Collapse duplicate ids, keeping first-seen order.
fn dedupe(ids: &[String]) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id.as_str()) {
            unique.push(id);
        }
    }
    unique
}

impl ComplyService {
    /// # Errors
    ///
    /// Returns `DatabaseError::ForeignKeyViolation` if the article does not
    /// exist in this organization. No row is written in that case.
    pub async fn create_obligation(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        article_id: &str,
        input: NewObligation,
    ) -> Result<Obligation, DatabaseError> {
        let now = Utc::now();
        let obligation = Obligation {
            id: self.db().generate_id(PREFIX_OBLIGATION).await?,
            organization_id: organization_id.to_string(),
            article_id: article_id.to_string(),
            title: input.title,
            summary: input.summary,
            status: ObligationStatus::INITIAL,
            risk_level: input.risk_level,
            owner_id: input.owner_id,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };
        let snapshot = &obligation;

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Created,
            EntityType::Obligation,
            &obligation.id,
            |conn| async move {
                conn.execute(
                    &format!(
                        "INSERT INTO obligations ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                    ),
                    libsql::params![
                        snapshot.id.as_str(),
                        snapshot.organization_id.as_str(),
                        snapshot.article_id.as_str(),
                        snapshot.title.as_str(),
                        snapshot.summary.as_deref(),
                        snapshot.status.as_str(),
                        snapshot.risk_level.as_str(),
                        snapshot.owner_id.as_deref(),
                        snapshot.due_date.map(|d| d.to_string()),
                        snapshot.created_at.to_rfc3339(),
                        snapshot.updated_at.to_rfc3339()
                    ],
                )
                .await?;
                Mutation::created(snapshot, snapshot.clone())
            },
        )
        .await
    }

    pub async fn get_obligation(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<Obligation, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_obligation(&conn, organization_id, id).await
    }

    /// List obligations of one organization, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_obligations(
        &self,
        organization_id: &str,
        filter: &ObligationFilter,
    ) -> Result<Vec<Obligation>, DatabaseError> {
        let mut conditions = vec!["organization_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![organization_id.into()];

        if let Some(ref article_id) = filter.article_id {
            params.push(libsql::Value::Text(article_id.clone()));
            conditions.push(format!("article_id = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(risk_level) = filter.risk_level {
            params.push(libsql::Value::Text(risk_level.as_str().to_string()));
            conditions.push(format!("risk_level = ?{}", params.len()));
        }
        if let Some(ref owner_id) = filter.owner_id {
            params.push(libsql::Value::Text(owner_id.clone()));
            conditions.push(format!("owner_id = ?{}", params.len()));
        }

        let limit_clause = filter
            .limit
            .map_or_else(String::new, |limit| format!(" LIMIT {limit}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM obligations WHERE {}
             ORDER BY created_at, id{limit_clause}",
            conditions.join(" AND ")
        );

        let conn = self.db().lock().await;
        let rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        collect(rows).await
    }

    /// Apply field changes. Only `Some` fields are written.
    ///
    /// An empty update returns the current row without an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
    pub async fn update_obligation(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        id: &str,
        update: ObligationUpdate,
    ) -> Result<Obligation, DatabaseError> {
        if update.is_empty() {
            return self.get_obligation(organization_id, id).await;
        }
        let update = &update;

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Updated,
            EntityType::Obligation,
            id,
            |conn| async move {
                let current = fetch_obligation(&conn, organization_id, id).await?;

                let mut sets = Vec::new();
                let mut params: Vec<libsql::Value> = Vec::new();
                let mut idx = 1usize;

                if let Some(ref title) = update.title {
                    sets.push(format!("title = ?{idx}"));
                    params.push(title.clone().into());
                    idx += 1;
                }
                if let Some(ref summary) = update.summary {
                    sets.push(format!("summary = ?{idx}"));
                    params.push(summary.clone().map_or(libsql::Value::Null, Into::into));
                    idx += 1;
                }
                if let Some(risk_level) = update.risk_level {
                    sets.push(format!("risk_level = ?{idx}"));
                    params.push(risk_level.as_str().into());
                    idx += 1;
                }
                if let Some(ref owner_id) = update.owner_id {
                    sets.push(format!("owner_id = ?{idx}"));
                    params.push(owner_id.clone().map_or(libsql::Value::Null, Into::into));
                    idx += 1;
                }
                if let Some(due_date) = update.due_date {
                    sets.push(format!("due_date = ?{idx}"));
                    params.push(due_date.map_or(libsql::Value::Null, |d| d.to_string().into()));
                    idx += 1;
                }

                let now = Utc::now();
                sets.push(format!("updated_at = ?{idx}"));
                params.push(now.to_rfc3339().into());
                idx += 1;

                params.push(organization_id.into());
                params.push(id.into());
                let sql = format!(
                    "UPDATE obligations SET {} WHERE organization_id = ?{idx} AND id = ?{}",
                    sets.join(", "),
                    idx + 1
                );
                conn.execute(&sql, libsql::params_from_iter(params)).await?;

                let updated = fetch_obligation(&conn, organization_id, id).await?;
                Mutation::changed(&current, &updated, updated.clone())
            },
        )
        .await
    }

    /// Move one obligation to `new_status`.
    ///
    /// Every state is reachable from every state. Re-applying the current
    /// status succeeds and is still audited.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidStatus` if `new_status` is not a known
    /// status (checked first), or `DatabaseError::NotFound` if the id does not
    /// resolve in the organization.
    pub async fn transition_obligation(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        obligation_id: &str,
        new_status: &str,
    ) -> Result<StatusTransition, DatabaseError> {
        let to: ObligationStatus = new_status.parse()?;

        let transition = self
            .with_audit(
                ctx,
                organization_id,
                AuditAction::StatusChanged,
                EntityType::Obligation,
                obligation_id,
                |conn| async move {
                    let current = fetch_obligation(&conn, organization_id, obligation_id).await?;
                    let updated = set_status(&conn, &current, to).await?;
                    let transition = StatusTransition {
                        from: current.status,
                        to,
                        obligation: updated.clone(),
                    };
                    Mutation::changed(&current, &updated, transition)
                },
            )
            .await?;

        tracing::debug!(
            organization_id,
            obligation_id,
            from = %transition.from,
            to = %transition.to,
            "obligation transitioned"
        );
        Ok(transition)
    }

    /// Move many obligations to `new_status` as one unit.
    ///
    /// Duplicate ids are collapsed. If any id does not resolve within the
    /// organization the whole batch is rejected before any write: no status
    /// changes and no audit entries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidStatus` for an unknown status, or
    /// `DatabaseError::BatchNotFound` listing the ids that did not resolve.
    pub async fn bulk_transition_obligations(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        ids: &[String],
        new_status: &str,
    ) -> Result<BulkTransition, DatabaseError> {
        let to: ObligationStatus = new_status.parse()?;
        ensure_tenant(ctx, organization_id)?;
        let unique = dedupe(ids);
        if unique.is_empty() {
            return Ok(BulkTransition::default());
        }

        let audit = self.audit();
        let unique = &unique;
        let bulk = self
            .in_write_tx(|conn| async move {
                let current = fetch_obligations_in(&conn, organization_id, unique).await?;
                let missing: Vec<String> = unique
                    .iter()
                    .filter(|id| !current.contains_key(**id))
                    .map(|id| (*id).to_string())
                    .collect();
                if !missing.is_empty() {
                    return Err(DatabaseError::BatchNotFound {
                        entity_type: EntityType::Obligation.as_str().to_string(),
                        missing,
                    });
                }

                let mut updated = Vec::with_capacity(unique.len());
                for id in unique {
                    let before = &current[*id];
                    let after = set_status(&conn, before, to).await?;
                    let record = AuditRecord::new(
                        AuditAction::StatusChanged,
                        EntityType::Obligation,
                        *id,
                        AuditDiff::between(Some(before), Some(&after))?,
                    );
                    audit.dispatch(&conn, ctx, &record).await;
                    updated.push(after);
                }
                Ok(BulkTransition { updated })
            })
            .await;

        match bulk {
            Ok(bulk) => {
                tracing::info!(
                    organization_id,
                    count = bulk.updated.len(),
                    to = %to,
                    "bulk transition committed"
                );
                Ok(bulk)
            }
            Err(e) => {
                tracing::warn!(organization_id, error = %e, "bulk transition rejected");
                Err(e)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
    pub async fn delete_obligation(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        id: &str,
    ) -> Result<Obligation, DatabaseError> {
        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Deleted,
            EntityType::Obligation,
            id,
            |conn| async move {
                let current = fetch_obligation(&conn, organization_id, id).await?;
                conn.execute(
                    "DELETE FROM obligations WHERE organization_id = ?1 AND id = ?2",
                    [organization_id, id],
                )
                .await?;
                Mutation::deleted(&current, current.clone())
            },
        )
        .await
    }
}
