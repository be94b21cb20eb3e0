//! Repository for the `templates` table.

use copydesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::Template;

/// Column list for `templates` queries.
const TEMPLATE_COLUMNS: &str = "id, name, markup, created_at, updated_at";

/// Read access for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Fetch a template record by id, or `None` if absent.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
