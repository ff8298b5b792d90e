//! Organization repository: tenant roots and tenant-wide cascade delete.

use chrono::Utc;

use comply_core::context::RequestContext;
use comply_core::entities::Organization;
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_ORGANIZATION;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::{ComplyService, Mutation, ensure_tenant};

const SELECT_COLS: &str = "id, name, slug, created_at";

fn row_to_organization(row: &libsql::Row) -> Result<Organization, DatabaseError> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

/// Fetch an organization by id.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if no organization has this id.
pub async fn fetch_organization(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Organization, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM organizations WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Organization.as_str(), id))?;
    row_to_organization(&row)
}

/// Row counts under one organization, reported when it is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TenantFootprint {
    pub regulations: u64,
    pub articles: u64,
    pub obligations: u64,
    pub systems: u64,
    pub mappings: u64,
    pub audit_entries: u64,
}

async fn tenant_footprint(
    conn: &libsql::Connection,
    organization_id: &str,
) -> Result<TenantFootprint, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT
                (SELECT COUNT(*) FROM regulations WHERE organization_id = ?1),
                (SELECT COUNT(*) FROM articles WHERE organization_id = ?1),
                (SELECT COUNT(*) FROM obligations WHERE organization_id = ?1),
                (SELECT COUNT(*) FROM systems WHERE organization_id = ?1),
                (SELECT COUNT(*) FROM obligation_system_mappings WHERE organization_id = ?1),
                (SELECT COUNT(*) FROM audit_log WHERE organization_id = ?1)",
            [organization_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let count = |idx: i32| -> Result<u64, DatabaseError> {
        let n = row.get::<i64>(idx)?;
        u64::try_from(n).map_err(|e| DatabaseError::InvalidState(format!("negative count: {e}")))
    };
    Ok(TenantFootprint {
        regulations: count(0)?,
        articles: count(1)?,
        obligations: count(2)?,
        systems: count(3)?,
        mappings: count(4)?,
        audit_entries: count(5)?,
    })
}

impl ComplyService {
    /// Create a tenant. The creation is audited inside the new tenant.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UniqueConstraintViolation` if the slug is taken.
    pub async fn create_organization(
        &self,
        ctx: &RequestContext,
        name: &str,
        slug: &str,
    ) -> Result<Organization, DatabaseError> {
        let id = self.db().generate_id(PREFIX_ORGANIZATION).await?;
        let audit_ctx = RequestContext {
            active_organization_id: Some(id.clone()),
            user_id: ctx.user_id.clone(),
        };
        let id = id.as_str();

        self.with_audit(
            &audit_ctx,
            id,
            AuditAction::Created,
            EntityType::Organization,
            id,
            |conn| async move {
                let now = Utc::now();
                conn.execute(
                    &format!("INSERT INTO organizations ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4)"),
                    libsql::params![id, name, slug, now.to_rfc3339()],
                )
                .await?;

                let organization = Organization {
                    id: id.to_string(),
                    name: name.to_string(),
                    slug: slug.to_string(),
                    created_at: now,
                };
                Mutation::created(&organization, organization.clone())
            },
        )
        .await
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_organization(&conn, id).await
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, DatabaseError> {
        let conn = self.db().lock().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM organizations ORDER BY created_at, id"),
                (),
            )
            .await?;

        let mut organizations = Vec::new();
        while let Some(row) = rows.next().await? {
            organizations.push(row_to_organization(&row)?);
        }
        Ok(organizations)
    }

    /// Delete an organization and everything under it in one transaction.
    ///
    /// The tenant's own audit log goes with it, so the deletion is reported
    /// through the operator log rather than an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the organization does not exist.
    pub async fn delete_organization(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
    ) -> Result<(), DatabaseError> {
        ensure_tenant(ctx, organization_id)?;
        let footprint = self
            .in_write_tx(|conn| async move {
                fetch_organization(&conn, organization_id).await?;
                let footprint = tenant_footprint(&conn, organization_id).await?;
                conn.execute("DELETE FROM organizations WHERE id = ?1", [organization_id])
                    .await?;
                Ok(footprint)
            })
            .await?;

        tracing::info!(
            organization_id,
            actor = ?ctx.user_id(),
            regulations = footprint.regulations,
            articles = footprint.articles,
            obligations = footprint.obligations,
            systems = footprint.systems,
            mappings = footprint.mappings,
            audit_entries = footprint.audit_entries,
            "organization deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_tree, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_organization_roundtrip() {
        let svc = test_service().await;
        let ctx = RequestContext::default();

        let org = svc.create_organization(&ctx, "Acme Bank", "acme").await.unwrap();
        assert!(org.id.starts_with("org-"));

        let fetched = svc.get_organization(&org.id).await.unwrap();
        assert_eq!(fetched, org);
    }

    #[tokio::test]
    async fn organization_creation_is_audited_in_new_tenant() {
        let svc = test_service().await;
        let org = svc
            .create_organization(&RequestContext::default(), "Acme", "acme")
            .await
            .unwrap();

        let stats = svc.audit_stats();
        assert_eq!(stats.written, 1);
        assert_eq!(stats.skipped, 0);

        let history = svc
            .audit_history(&org.id, EntityType::Organization, &org.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, AuditAction::Created);
    }

    #[tokio::test]
    async fn duplicate_org_slug_rejected() {
        let svc = test_service().await;
        let ctx = RequestContext::default();
        svc.create_organization(&ctx, "A", "same").await.unwrap();

        let result = svc.create_organization(&ctx, "B", "same").await;
        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
        assert_eq!(svc.list_organizations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_missing_organization_is_not_found() {
        let svc = test_service().await;
        let result = svc.get_organization("org-00000000").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_organization_removes_everything() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;

        svc.delete_organization(&tree.ctx, &tree.org.id).await.unwrap();

        let conn = svc.db().lock().await;
        let footprint = tenant_footprint(&conn, &tree.org.id).await.unwrap();
        assert_eq!(footprint, TenantFootprint::default());
    }

    #[tokio::test]
    async fn delete_missing_organization_is_not_found() {
        let svc = test_service().await;
        let result = svc
            .delete_organization(&RequestContext::default(), "org-00000000")
            .await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
