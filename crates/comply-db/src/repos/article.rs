//! Article repository.

use chrono::Utc;

use comply_core::context::RequestContext;
use comply_core::entities::Article;
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_ARTICLE;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::{ComplyService, Mutation};

const SELECT_COLS: &str = "id, organization_id, regulation_id, article_number, title, created_at";

fn row_to_article(row: &libsql::Row) -> Result<Article, DatabaseError> {
    Ok(Article {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        regulation_id: row.get(2)?,
        article_number: row.get(3)?,
        title: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Fetch an article within one organization.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the id does not resolve in the organization.
pub async fn fetch_article(
    conn: &libsql::Connection,
    organization_id: &str,
    id: &str,
) -> Result<Article, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM articles WHERE organization_id = ?1 AND id = ?2"),
            [organization_id, id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Article.as_str(), id))?;
    row_to_article(&row)
}

/// All articles of one regulation, in article-number order.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn fetch_articles(
    conn: &libsql::Connection,
    organization_id: &str,
    regulation_id: &str,
) -> Result<Vec<Article>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM articles
                 WHERE organization_id = ?1 AND regulation_id = ?2
                 ORDER BY article_number, id"
            ),
            [organization_id, regulation_id],
        )
        .await?;

    let mut articles = Vec::new();
    while let Some(row) = rows.next().await? {
        articles.push(row_to_article(&row)?);
    }
    Ok(articles)
}

impl ComplyService {
    /// # Errors
    ///
    /// Returns `DatabaseError::ForeignKeyViolation` if the regulation does not
    /// exist in this organization.
    pub async fn create_article(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        regulation_id: &str,
        article_number: &str,
        title: Option<&str>,
    ) -> Result<Article, DatabaseError> {
        let article = Article {
            id: self.db().generate_id(PREFIX_ARTICLE).await?,
            organization_id: organization_id.to_string(),
            regulation_id: regulation_id.to_string(),
            article_number: article_number.to_string(),
            title: title.map(String::from),
            created_at: Utc::now(),
        };
        let snapshot = &article;

        self.with_audit(
            ctx,
            organization_id,
            AuditAction::Created,
            EntityType::Article,
            &article.id,
            |conn| async move {
                conn.execute(
                    &format!("INSERT INTO articles ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                    libsql::params![
                        snapshot.id.as_str(),
                        snapshot.organization_id.as_str(),
                        snapshot.regulation_id.as_str(),
                        snapshot.article_number.as_str(),
                        snapshot.title.as_deref(),
                        snapshot.created_at.to_rfc3339()
                    ],
                )
                .await?;
                Mutation::created(snapshot, snapshot.clone())
            },
        )
        .await
    }

    pub async fn get_article(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<Article, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_article(&conn, organization_id, id).await
    }

    pub async fn list_articles(
        &self,
        organization_id: &str,
        regulation_id: &str,
    ) -> Result<Vec<Article>, DatabaseError> {
        let conn = self.db().lock().await;
        fetch_articles(&conn, organization_id, regulation_id).await
    }
}
