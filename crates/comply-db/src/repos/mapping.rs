//! Obligation/system mapping repository.
//!
//! Both ends must belong to the mapping's organization; the composite foreign
//! keys reject anything else.

use chrono::Utc;

use comply_core::context::RequestContext;
use comply_core::entities::{Obligation, ObligationSystemMapping, System};
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_MAPPING;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::repos::obligation::fetch_obligations_for_system;
use crate::repos::system::row_to_system;
use crate::service::{ComplyService, Mutation};

const SELECT_COLS: &str = "id, organization_id, obligation_id, system_id, created_at";

fn row_to_mapping(row: &libsql::Row) -> Result<ObligationSystemMapping, DatabaseError> {
    Ok(ObligationSystemMapping {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        obligation_id: row.get(2)?,
        system_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

async fn fetch_mapping(
    conn: &libsql::Connection,
    organization_id: &str,
    obligation_id: &str,
    system_id: &str,
) -> Result<ObligationSystemMapping, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM obligation_system_mappings
                 WHERE organization_id = ?1 AND obligation_id = ?2 AND system_id = ?3"
            ),
            [organization_id, obligation_id, system_id],
        )
        .await?;
    let row = rows.next().await?.ok_or_else(|| {
        DatabaseError::not_found(
            EntityType::ObligationSystemMapping.as_str(),
            format!("{obligation_id}/{system_id}"),
        )
    })?;
    row_to_mapping(&row)
}

impl ComplyService {
    /// Put a system in scope of an obligation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ForeignKeyViolation` if either end is not in the
    /// organization, or `UniqueConstraintViolation` if the pair is already mapped.
    pub async fn map_obligation_to_system(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        obligation_id: &str,
        system_id: &str,
    ) -> Result<ObligationSystemMapping, DatabaseError> {
        let mapping = ObligationSystemMapping {
            id: self.db().generate_id(PREFIX_MAPPING).await?,
            organization_id: organization_id.to_string(),
            obligation_id: obligation_id.to_string(),
            system_id: system_id.to_string(),
            created_at: Utc::now(),
        };
        let snapshot = &mapping;

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Mapped,
            EntityType::ObligationSystemMapping,
            &mapping.id,
            |conn| async move {
                conn.execute(
                    &format!(
                        "INSERT INTO obligation_system_mappings ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    libsql::params![
                        snapshot.id.as_str(),
                        snapshot.organization_id.as_str(),
                        snapshot.obligation_id.as_str(),
                        snapshot.system_id.as_str(),
                        snapshot.created_at.to_rfc3339()
                    ],
                )
                .await?;
                Mutation::created(snapshot, snapshot.clone())
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the pair is not mapped in the organization.
    pub async fn unmap_obligation_from_system(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        obligation_id: &str,
        system_id: &str,
    ) -> Result<(), DatabaseError> {
        let entity_id = {
            let conn = self.db().lock().await;
            fetch_mapping(&conn, organization_id, obligation_id, system_id)
                .await?
                .id
        };

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Unmapped,
            EntityType::ObligationSystemMapping,
            &entity_id,
            |conn| async move {
                let current = fetch_mapping(&conn, organization_id, obligation_id, system_id).await?;
                conn.execute(
                    "DELETE FROM obligation_system_mappings WHERE id = ?1",
                    [current.id.as_str()],
                )
                .await?;
                Mutation::deleted(&current, ())
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the pair is not mapped in the organization.
    pub async fn get_mapping(
        &self,
        organization_id: &str,
        obligation_id: &str,
        system_id: &str,
    ) -> Result<ObligationSystemMapping, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_mapping(&conn, organization_id, obligation_id, system_id).await
    }

    pub async fn systems_for_obligation(
        &self,
        organization_id: &str,
        obligation_id: &str,
    ) -> Result<Vec<System>, DatabaseError> {
        let conn = self.db().lock().await;
        let mut rows = conn
            .query(
                "SELECT s.id, s.organization_id, s.name, s.slug, s.category, s.criticality, s.created_at
                 FROM systems s
                 JOIN obligation_system_mappings m
                   ON m.organization_id = s.organization_id AND m.system_id = s.id
                 WHERE m.organization_id = ?1 AND m.obligation_id = ?2
                 ORDER BY s.slug",
                [organization_id, obligation_id],
            )
            .await?;

        let mut systems = Vec::new();
        while let Some(row) = rows.next().await? {
            systems.push(row_to_system(&row)?);
        }
        Ok(systems)
    }

    pub async fn obligations_for_system(
        &self,
        organization_id: &str,
        system_id: &str,
    ) -> Result<Vec<Obligation>, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_obligations_for_system(&conn, organization_id, system_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{new_system, seed_tree, test_service};

    #[tokio::test]
    async fn map_and_query_both_directions() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;
        let system = svc
            .create_system(&tree.ctx, &tree.org.id, new_system("ledger"))
            .await
            .unwrap();

        let mapping = svc
            .map_obligation_to_system(&tree.ctx, &tree.org.id, &tree.obligation.id, &system.id)
            .await
            .unwrap();
        assert!(mapping.id.starts_with("map-"));

        let systems = svc
            .systems_for_obligation(&tree.org.id, &tree.obligation.id)
            .await
            .unwrap();
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].id, system.id);

        let obligations = svc
            .obligations_for_system(&tree.org.id, &system.id)
            .await
            .unwrap();
        assert_eq!(obligations.len(), 1);
        assert_eq!(obligations[0].id, tree.obligation.id);
    }

    #[tokio::test]
    async fn duplicate_mapping_rejected() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;
        let system = svc
            .create_system(&tree.ctx, &tree.org.id, new_system("ledger"))
            .await
            .unwrap();
        let (org, obl, sys) = (&tree.org.id, &tree.obligation.id, &system.id);

        svc.map_obligation_to_system(&tree.ctx, org, obl, sys)
            .await
            .unwrap();
        let again = svc.map_obligation_to_system(&tree.ctx, org, obl, sys).await;
        assert!(matches!(again, Err(DatabaseError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn cross_tenant_mapping_rejected() {
        let svc = test_service().await;
        let a = seed_tree(&svc, "a").await;
        let b = seed_tree(&svc, "b").await;
        let foreign = svc
            .create_system(&b.ctx, &b.org.id, new_system("ledger"))
            .await
            .unwrap();

        let result = svc
            .map_obligation_to_system(&a.ctx, &a.org.id, &a.obligation.id, &foreign.id)
            .await;
        assert!(matches!(result, Err(DatabaseError::ForeignKeyViolation(_))));
    }

    #[tokio::test]
    async fn unmap_removes_mapping() {
        let svc = test_service().await;
        let tree = seed_tree(&svc, "acme").await;
        let system = svc
            .create_system(&tree.ctx, &tree.org.id, new_system("ledger"))
            .await
            .unwrap();
        let (org, obl, sys) = (&tree.org.id, &tree.obligation.id, &system.id);

        let mapping = svc
            .map_obligation_to_system(&tree.ctx, org, obl, sys)
            .await
            .unwrap();
        assert_eq!(svc.get_mapping(org, obl, sys).await.unwrap(), mapping);

        svc.unmap_obligation_from_system(&tree.ctx, org, obl, sys)
            .await
            .unwrap();
        assert!(svc.systems_for_obligation(org, obl).await.unwrap().is_empty());
        assert!(matches!(
            svc.get_mapping(org, obl, sys).await,
            Err(DatabaseError::NotFound { .. })
        ));

        let missing = svc.unmap_obligation_from_system(&tree.ctx, org, obl, sys).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }
}
