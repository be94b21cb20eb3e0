//! Repository for the `layouts` table.

use copydesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::Layout;

/// Column list for `layouts` queries.
const LAYOUT_COLUMNS: &str = "id, name, definition, created_at, updated_at";

/// Read access for layouts.
pub struct LayoutRepo;

impl LayoutRepo {
    /// Fetch a layout record by id, or `None` if absent.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Layout>, sqlx::Error> {
        let query = format!("SELECT {LAYOUT_COLUMNS} FROM layouts WHERE id = $1");
        sqlx::query_as::<_, Layout>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
