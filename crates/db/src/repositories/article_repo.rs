//! Repository for the `articles` table.

use copydesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::Article;

/// Column list for `articles` queries.
const ARTICLE_COLUMNS: &str = "id, slug, title, body, metadata, permissions, \
                               created_at, updated_at";

/// Read access for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    /// Fetch an article in its edit-mode shape (content, metadata,
    /// permissions), or `None` if it has been deleted.
    pub async fn find_for_edit(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
