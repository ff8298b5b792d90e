//! Regulation repository: CRUD plus the audited cascade delete.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use comply_core::audit_diff::AuditDiff;
use comply_core::context::RequestContext;
use comply_core::entities::Regulation;
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_REGULATION;

use crate::audit::AuditRecord;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::repos::article::fetch_articles;
use crate::repos::obligation::fetch_obligations_for_regulation;
use crate::service::{ComplyService, Mutation, ensure_tenant};

const SELECT_COLS: &str = "id, organization_id, name, slug, framework, full_title, created_at";

/// Input for [`ComplyService::create_regulation`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRegulation {
    pub name: String,
    pub slug: String,
    pub framework: Option<String>,
    pub full_title: Option<String>,
}

/// What a regulation delete removed.
#[derive(Debug, Clone, Serialize)]
pub struct RegulationDeletion {
    pub regulation: Regulation,
    pub articles: usize,
    pub obligations: usize,
}

fn row_to_regulation(row: &libsql::Row) -> Result<Regulation, DatabaseError> {
    Ok(Regulation {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        framework: get_opt_string(row, 4)?,
        full_title: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Fetch a regulation within one organization.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
pub async fn fetch_regulation(
    conn: &libsql::Connection,
    organization_id: &str,
    id: &str,
) -> Result<Regulation, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM regulations WHERE organization_id = ?1 AND id = ?2"
            ),
            [organization_id, id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Regulation.as_str(), id))?;
    row_to_regulation(&row)
}

impl ComplyService {
    /// # Errors
    ///
    /// Returns `DatabaseError::UniqueConstraintViolation` if the slug is taken
    /// in this organization, or `ForeignKeyViolation` if the organization does
    /// not exist.
    pub async fn create_regulation(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        input: NewRegulation,
    ) -> Result<Regulation, DatabaseError> {
        let id = self.db().generate_id(PREFIX_REGULATION).await?;
        let regulation = Regulation {
            id,
            organization_id: organization_id.to_string(),
            name: input.name,
            slug: input.slug,
            framework: input.framework,
            full_title: input.full_title,
            created_at: Utc::now(),
        };
        let snapshot = &regulation;

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Created,
            EntityType::Regulation,
            &regulation.id,
            |conn| async move {
                conn.execute(
                    &format!(
                        "INSERT INTO regulations ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    libsql::params![
                        snapshot.id.as_str(),
                        snapshot.organization_id.as_str(),
                        snapshot.name.as_str(),
                        snapshot.slug.as_str(),
                        snapshot.framework.as_deref(),
                        snapshot.full_title.as_deref(),
                        snapshot.created_at.to_rfc3339()
                    ],
                )
                .await?;
                Mutation::created(snapshot, snapshot.clone())
            },
        )
        .await
    }

    pub async fn get_regulation(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<Regulation, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_regulation(&conn, organization_id, id).await
    }

    pub async fn list_regulations(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Regulation>, DatabaseError> {
        let conn = self.db().lock().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM regulations WHERE organization_id = ?1
                     ORDER BY slug"
                ),
                [organization_id],
            )
            .await?;

        let mut regulations = Vec::new();
        while let Some(row) = rows.next().await? {
            regulations.push(row_to_regulation(&row)?);
        }
        Ok(regulations)
    }

    /// Delete a regulation with all of its articles and their obligations.
    ///
    /// One transaction. Every removed regulation, article, and obligation gets
    /// its own `deleted` audit entry carrying its last snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the regulation does not resolve in
    /// the organization.
    pub async fn delete_regulation(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        id: &str,
    ) -> Result<RegulationDeletion, DatabaseError> {
        ensure_tenant(ctx, organization_id)?;
        let audit = self.audit();
        let deletion = self
            .in_write_tx(|conn| async move {
                let regulation = fetch_regulation(&conn, organization_id, id).await?;
                let articles = fetch_articles(&conn, organization_id, id).await?;
                let obligations =
                    fetch_obligations_for_regulation(&conn, organization_id, id).await?;

                conn.execute(
                    "DELETE FROM regulations WHERE organization_id = ?1 AND id = ?2",
                    [organization_id, id],
                )
                .await?;

                for obligation in &obligations {
                    let record = AuditRecord::new(
                        AuditAction::Deleted,
                        EntityType::Obligation,
                        &obligation.id,
                        AuditDiff::deleted(obligation)?,
                    );
                    audit.dispatch(&conn, ctx, &record).await;
                }
                for article in &articles {
                    let record = AuditRecord::new(
                        AuditAction::Deleted,
                        EntityType::Article,
                        &article.id,
                        AuditDiff::deleted(article)?,
                    );
                    audit.dispatch(&conn, ctx, &record).await;
                }
                let record = AuditRecord::new(
                    AuditAction::Deleted,
                    EntityType::Regulation,
                    id,
                    AuditDiff::deleted(&regulation)?,
                );
                audit.dispatch(&conn, ctx, &record).await;

                Ok(RegulationDeletion {
                    regulation,
                    articles: articles.len(),
                    obligations: obligations.len(),
                })
            })
            .await?;

        tracing::info!(
            organization_id,
            regulation_id = id,
            articles = deletion.articles,
            obligations = deletion.obligations,
            "regulation deleted"
        );
        Ok(deletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditQuery;
    use crate::test_support::helpers::{new_regulation, seed_tree, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_regulation_roundtrip() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;

        let fetched = svc
            .get_regulation(&tree.org.id, &tree.regulation.id)
            .await
            .unwrap();
        assert_eq!(fetched, tree.regulation);
        assert!(fetched.id.starts_with("reg-"));
    }

    #[tokio::test]
    async fn regulation_invisible_from_other_org() {
        let svc = test_service().await;
        let a = seed_tree(&svc, "a").await;
        let b = seed_tree(&svc, "b").await;

        let result = svc.get_regulation(&b.org.id, &a.regulation.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_regulations_scoped() {
        let svc = test_service().await;
        let a = seed_tree(&svc, "a").await;
        svc.create_regulation(&a.ctx, &a.org.id, new_regulation("nis2"))
            .await
            .unwrap();
        seed_tree(&svc, "b").await;

        let regulations = svc.list_regulations(&a.org.id).await.unwrap();
        assert_eq!(regulations.len(), 2);
        assert!(regulations.iter().all(|r| r.organization_id == a.org.id));
    }

    #[tokio::test]
    async fn delete_regulation_audits_each_removed_row() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;

        let deletion = svc
            .delete_regulation(&tree.ctx, &tree.org.id, &tree.regulation.id)
            .await
            .unwrap();
        assert_eq!(deletion.articles, 1);
        assert_eq!(deletion.obligations, 1);

        let page = svc
            .get_audit_log(
                &tree.org.id,
                &AuditQuery {
                    action: Some(AuditAction::Deleted),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        let kinds: Vec<EntityType> = page.entries.iter().map(|e| e.entity_type).collect();
        // Newest first: the regulation entry is written last.
        assert_eq!(
            kinds,
            vec![EntityType::Regulation, EntityType::Article, EntityType::Obligation]
        );
        assert!(page.entries.iter().all(|e| e.diff.after.is_none()));
    }
}
