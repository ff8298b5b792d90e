//! Shared test utilities for comply-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use comply_config::AuditConfig;
    use comply_core::context::RequestContext;
    use comply_core::entities::{Article, Obligation, Organization, Regulation};

    use crate::ComplyDb;
    use crate::repos::obligation::NewObligation;
    use crate::repos::regulation::NewRegulation;
    use crate::repos::system::NewSystem;
    use crate::service::ComplyService;

    /// Create an in-memory ComplyService with default audit paging.
    pub async fn test_service() -> ComplyService {
        let db = ComplyDb::open_local(":memory:").await.unwrap();
        ComplyService::from_db(db, AuditConfig::default())
    }

    /// Create an in-memory ComplyService with custom audit page sizes.
    pub async fn test_service_with_pages(default_page_size: u32, max_page_size: u32) -> ComplyService {
        let db = ComplyDb::open_local(":memory:").await.unwrap();
        ComplyService::from_db(
            db,
            AuditConfig {
                default_page_size,
                max_page_size,
            },
        )
    }

    /// One organization with a regulation, an article, and an obligation.
    pub struct Tree {
        pub ctx: RequestContext,
        pub org: Organization,
        pub regulation: Regulation,
        pub article: Article,
        pub obligation: Obligation,
    }

    pub fn new_regulation(slug: &str) -> NewRegulation {
        NewRegulation {
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    pub fn new_obligation(title: &str) -> NewObligation {
        NewObligation {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn new_system(slug: &str) -> NewSystem {
        NewSystem {
            name: slug.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    /// Seed a tenant tree. Writes exactly four audit entries in the new tenant.
    pub async fn seed_tree(svc: &ComplyService, slug: &str) -> Tree {
        let org = svc
            .create_organization(&RequestContext::default(), slug, slug)
            .await
            .unwrap();
        let ctx = RequestContext::new(&org.id, "user_1");
        let regulation = svc
            .create_regulation(&ctx, &org.id, new_regulation("dora"))
            .await
            .unwrap();
        let article = svc
            .create_article(&ctx, &org.id, &regulation.id, "6", Some("ICT risk framework"))
            .await
            .unwrap();
        let obligation = svc
            .create_obligation(&ctx, &org.id, &article.id, new_obligation("Maintain framework"))
            .await
            .unwrap();

        Tree {
            ctx,
            org,
            regulation,
            article,
            obligation,
        }
    }
}
