//! System repository.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use comply_core::context::RequestContext;
use comply_core::entities::System;
use comply_core::enums::{AuditAction, Criticality, EntityType};
use comply_core::ids::PREFIX_SYSTEM;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::{ComplyService, Mutation};

pub(crate) const SELECT_COLS: &str = "id, organization_id, name, slug, category, criticality, created_at";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSystem {
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    #[serde(default)]
    pub criticality: Criticality,
}

pub(crate) fn row_to_system(row: &libsql::Row) -> Result<System, DatabaseError> {
    Ok(System {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        category: get_opt_string(row, 4)?,
        criticality: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Fetch a system within one organization.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
pub async fn fetch_system(
    conn: &libsql::Connection,
    organization_id: &str,
    id: &str,
) -> Result<System, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM systems WHERE organization_id = ?1 AND id = ?2"),
            [organization_id, id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::System.as_str(), id))?;
    row_to_system(&row)
}

impl ComplyService {
    /// # Errors
    ///
    /// Returns `DatabaseError::UniqueConstraintViolation` if the slug is taken
    /// in this organization.
    pub async fn create_system(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        input: NewSystem,
    ) -> Result<System, DatabaseError> {
        let system = System {
            id: self.db().generate_id(PREFIX_SYSTEM).await?,
            organization_id: organization_id.to_string(),
            name: input.name,
            slug: input.slug,
            category: input.category,
            criticality: input.criticality,
            created_at: Utc::now(),
        };
        let snapshot = &system;

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Created,
            EntityType::System,
            &system.id,
            |conn| async move {
                conn.execute(
                    &format!("INSERT INTO systems ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                    libsql::params![
                        snapshot.id.as_str(),
                        snapshot.organization_id.as_str(),
                        snapshot.name.as_str(),
                        snapshot.slug.as_str(),
                        snapshot.category.as_deref(),
                        snapshot.criticality.as_str(),
                        snapshot.created_at.to_rfc3339()
                    ],
                )
                .await?;
                Mutation::created(snapshot, snapshot.clone())
            },
        )
        .await
    }

    pub async fn get_system(&self, organization_id: &str, id: &str) -> Result<System, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_system(&conn, organization_id, id).await
    }

    pub async fn list_systems(&self, organization_id: &str) -> Result<Vec<System>, DatabaseError> {
        let conn = self.db().lock().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM systems WHERE organization_id = ?1 ORDER BY slug"),
                [organization_id],
            )
            .await?;

        let mut systems = Vec::new();
        while let Some(row) = rows.next().await? {
            systems.push(row_to_system(&row)?);
        }
        Ok(systems)
    }

    /// Delete a system. Its obligation mappings cascade.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
    pub async fn delete_system(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        id: &str,
    ) -> Result<System, DatabaseError> {
        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Deleted,
            EntityType::System,
            id,
            |conn| async move {
                let current = fetch_system(&conn, organization_id, id).await?;
                conn.execute(
                    "DELETE FROM systems WHERE organization_id = ?1 AND id = ?2",
                    [organization_id, id],
                )
                .await?;
                Mutation::deleted(&current, current.clone())
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{new_system, seed_tree, test_service};

    #[tokio::test]
    async fn same_slug_in_two_orgs() {
        let svc = test_service().await;
        let a = seed_tree(&svc, "a").await;
        let b = seed_tree(&svc, "b").await;

        svc.create_system(&a.ctx, &a.org.id, new_system("core-ledger"))
            .await
            .unwrap();
        svc.create_system(&b.ctx, &b.org.id, new_system("core-ledger"))
            .await
            .unwrap();

        let again = svc
            .create_system(&a.ctx, &a.org.id, new_system("core-ledger"))
            .await;
        assert!(matches!(again, Err(DatabaseError::UniqueConstraintViolation(_))));
        assert_eq!(svc.list_systems(&a.org.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_system_roundtrip() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;
        let system = svc
            .create_system(&tree.ctx, &tree.org.id, new_system("crm"))
            .await
            .unwrap();
        assert_eq!(system.criticality, Criticality::Medium);

        svc.delete_system(&tree.ctx, &tree.org.id, &system.id)
            .await
            .unwrap();
        let result = svc.get_system(&tree.org.id, &system.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
