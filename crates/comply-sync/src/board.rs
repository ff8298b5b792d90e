//! Optimistic board of one organization's obligations.

use std::collections::HashMap;
use std::sync::Arc;

use comply_core::context::RequestContext;
use comply_core::entities::Obligation;
use comply_core::enums::ObligationStatus;
use comply_db::error::DatabaseError;
use comply_db::repos::obligation::{BulkTransition, ObligationFilter, StatusTransition};
use comply_db::service::ComplyService;

use crate::cache::{OptimisticCache, ViewSource};
use crate::error::MutationError;

/// Obligations keyed by id.
pub type BoardState = HashMap<String, Obligation>;

/// A tenant's obligations as served by [`ComplyService`].
pub struct TenantObligations {
    service: Arc<ComplyService>,
    organization_id: String,
    filter: ObligationFilter,
}

impl ViewSource for TenantObligations {
    type State = BoardState;
    type Error = DatabaseError;

    async fn fetch(&self) -> Result<BoardState, DatabaseError> {
        let obligations = self
            .service
            .list_obligations(&self.organization_id, &self.filter)
            .await?;
        Ok(obligations.into_iter().map(|o| (o.id.clone(), o)).collect())
    }
}

pub struct ObligationBoard {
    ctx: RequestContext,
    cache: OptimisticCache<TenantObligations>,
}

impl ObligationBoard {
    /// Load every obligation of `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the initial fetch fails.
    pub async fn load(
        service: Arc<ComplyService>,
        ctx: RequestContext,
        organization_id: impl Into<String>,
    ) -> Result<Self, DatabaseError> {
        Self::load_filtered(service, ctx, organization_id, ObligationFilter::default()).await
    }

    /// Load the obligations matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the initial fetch fails.
    pub async fn load_filtered(
        service: Arc<ComplyService>,
        ctx: RequestContext,
        organization_id: impl Into<String>,
        filter: ObligationFilter,
    ) -> Result<Self, DatabaseError> {
        let source = TenantObligations {
            service,
            organization_id: organization_id.into(),
            filter,
        };
        let cache = OptimisticCache::load(source).await?;
        Ok(Self { ctx, cache })
    }

    pub fn organization_id(&self) -> &str {
        &self.cache.source().organization_id
    }

    pub fn is_pending(&self) -> bool {
        self.cache.is_pending()
    }

    /// True when the board could not be refetched after its last change.
    pub fn is_stale(&self) -> bool {
        self.cache.is_stale()
    }

    pub async fn get(&self, id: &str) -> Option<Obligation> {
        self.cache.read(|board| board.get(id).cloned()).await
    }

    /// Cached obligations ordered by creation time.
    pub async fn obligations(&self) -> Vec<Obligation> {
        let mut obligations: Vec<Obligation> =
            self.cache.read(|board| board.values().cloned().collect()).await;
        obligations.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        obligations
    }

    pub async fn count_with_status(&self, status: ObligationStatus) -> usize {
        self.cache
            .read(|board| board.values().filter(|o| o.status == status).count())
            .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the fetch fails.
    pub async fn refresh(&self) -> Result<(), DatabaseError> {
        self.cache.refresh().await
    }

    /// Move one obligation to `status`, showing the change immediately.
    ///
    /// # Errors
    ///
    /// See [`OptimisticCache::mutate`].
    pub async fn transition(
        &self,
        id: &str,
        status: ObligationStatus,
    ) -> Result<StatusTransition, MutationError<DatabaseError>> {
        let source = self.cache.source();
        self.cache
            .mutate(
                |board| mark(board, [id], status),
                || {
                    source.service.transition_obligation(
                        &self.ctx,
                        &source.organization_id,
                        id,
                        status.as_str(),
                    )
                },
            )
            .await
    }

    /// Move every listed obligation to `status`, showing the change
    /// immediately. If the store rejects the batch the whole board reverts.
    ///
    /// # Errors
    ///
    /// See [`OptimisticCache::mutate`].
    pub async fn bulk_transition(
        &self,
        ids: &[String],
        status: ObligationStatus,
    ) -> Result<BulkTransition, MutationError<DatabaseError>> {
        let source = self.cache.source();
        tracing::debug!(
            organization_id = %source.organization_id,
            count = ids.len(),
            to = %status,
            "optimistic bulk transition"
        );
        self.cache
            .mutate(
                |board| mark(board, ids.iter().map(String::as_str), status),
                || {
                    source.service.bulk_transition_obligations(
                        &self.ctx,
                        &source.organization_id,
                        ids,
                        status.as_str(),
                    )
                },
            )
            .await
    }
}

/// Local guess: ids not on the board are left for the store to reject.
fn mark<'a>(board: &mut BoardState, ids: impl IntoIterator<Item = &'a str>, status: ObligationStatus) {
    for id in ids {
        if let Some(obligation) = board.get_mut(id) {
            obligation.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use comply_config::AuditConfig;
    use comply_db::repos::obligation::NewObligation;
    use comply_db::repos::regulation::NewRegulation;

    use super::*;

    struct Seeded {
        service: Arc<ComplyService>,
        ctx: RequestContext,
        org: String,
        ids: Vec<String>,
    }

    async fn seed(service: &ComplyService, slug: &str, n: usize) -> (RequestContext, String, Vec<String>) {
        let org = service
            .create_organization(&RequestContext::default(), slug, slug)
            .await
            .unwrap();
        let ctx = RequestContext::new(&org.id, "user_1");
        let regulation = service
            .create_regulation(
                &ctx,
                &org.id,
                NewRegulation {
                    name: "DORA".into(),
                    slug: "dora".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let article = service
            .create_article(&ctx, &org.id, &regulation.id, "6", None)
            .await
            .unwrap();

        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            let obligation = service
                .create_obligation(
                    &ctx,
                    &org.id,
                    &article.id,
                    NewObligation {
                        title: format!("obligation {i}"),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            ids.push(obligation.id);
        }
        (ctx, org.id, ids)
    }

    async fn setup(n: usize) -> Seeded {
        let service = Arc::new(
            ComplyService::new_local(":memory:", AuditConfig::default())
                .await
                .unwrap(),
        );
        let (ctx, org, ids) = seed(&service, "acme", n).await;
        Seeded {
            service,
            ctx,
            org,
            ids,
        }
    }

    #[tokio::test]
    async fn bulk_transition_commits_and_refreshes() {
        let s = setup(10).await;
        let board = ObligationBoard::load(Arc::clone(&s.service), s.ctx.clone(), &s.org)
            .await
            .unwrap();

        let bulk = board
            .bulk_transition(&s.ids, ObligationStatus::Verified)
            .await
            .unwrap();

        assert_eq!(bulk.updated.len(), 10);
        assert_eq!(board.count_with_status(ObligationStatus::Verified).await, 10);
        let stored = s
            .service
            .list_obligations(&s.org, &ObligationFilter::default())
            .await
            .unwrap();
        assert_eq!(board.obligations().await, stored);
    }

    #[tokio::test]
    async fn rejected_batch_reverts_all_ten() {
        let s = setup(10).await;
        let (_, _, foreign) = seed(&s.service, "other", 1).await;
        let board = ObligationBoard::load(Arc::clone(&s.service), s.ctx.clone(), &s.org)
            .await
            .unwrap();
        let before = board.obligations().await;

        let mut ids = s.ids.clone();
        ids.push(foreign[0].clone());
        let err = board
            .bulk_transition(&ids, ObligationStatus::Verified)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MutationError::RolledBack(DatabaseError::BatchNotFound { .. })
        ));
        assert!(err.to_string().contains("no changes applied"));
        assert_eq!(board.obligations().await, before);
        assert_eq!(board.count_with_status(ObligationStatus::NotStarted).await, 10);
        assert!(!board.is_pending());
        assert!(!board.is_stale());

        let stored = s
            .service
            .list_obligations(&s.org, &ObligationFilter::default())
            .await
            .unwrap();
        assert_eq!(stored, before);
    }

    #[tokio::test]
    async fn single_transition_updates_one_card() {
        let s = setup(2).await;
        let board = ObligationBoard::load(Arc::clone(&s.service), s.ctx.clone(), &s.org)
            .await
            .unwrap();

        let transition = board
            .transition(&s.ids[0], ObligationStatus::InProgress)
            .await
            .unwrap();

        assert_eq!(transition.to, ObligationStatus::InProgress);
        assert_eq!(
            board.get(&s.ids[0]).await.unwrap().status,
            ObligationStatus::InProgress
        );
        assert_eq!(
            board.get(&s.ids[1]).await.unwrap().status,
            ObligationStatus::NotStarted
        );
    }

    #[tokio::test]
    async fn unknown_id_rolls_back() {
        let s = setup(1).await;
        let board = ObligationBoard::load(Arc::clone(&s.service), s.ctx.clone(), &s.org)
            .await
            .unwrap();

        let err = board
            .transition("obl-00000000", ObligationStatus::Verified)
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::RolledBack(DatabaseError::NotFound { .. })));
        assert_eq!(board.organization_id(), s.org);
    }
}
