//! Repository for the `edit_locks` table.

use copydesk_core::lock::AcquireRequest;
use sqlx::PgPool;

use crate::models::lock::EditLock;

/// Column list for `edit_locks` queries.
const LOCK_COLUMNS: &str = "id, resource_id, holder_connection_id, \
                            holder_identity, editor_kind, file_path, acquired_at";

/// Data access for exclusive edit locks.
pub struct EditLockRepo;

impl EditLockRepo {
    /// Attempt to acquire the lock on a resource.
    ///
    /// Uses `INSERT ... ON CONFLICT DO NOTHING` against the unique
    /// constraint on `resource_id`. If the insert succeeds the new lock is
    /// returned; if it is a no-op (resource already locked) `None` is
    /// returned and the existing row is left untouched.
    pub async fn acquire(
        pool: &PgPool,
        request: &AcquireRequest,
    ) -> Result<Option<EditLock>, sqlx::Error> {
        let query = format!(
            "INSERT INTO edit_locks \
             (resource_id, holder_connection_id, holder_identity, editor_kind, file_path) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (resource_id) DO NOTHING \
             RETURNING {LOCK_COLUMNS}"
        );
        sqlx::query_as::<_, EditLock>(&query)
            .bind(&request.resource_id)
            .bind(&request.connection_id)
            .bind(&request.identity)
            .bind(request.editor_kind.as_str())
            .bind(&request.file_path)
            .fetch_optional(pool)
            .await
    }

    /// Delete the lock on a resource if it is held by the given connection.
    ///
    /// Returns `true` if a lock was deleted. A lock held by a different
    /// connection does not match the predicate and survives.
    pub async fn release(
        pool: &PgPool,
        resource_id: &str,
        connection_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM edit_locks \
             WHERE resource_id = $1 AND holder_connection_id = $2",
        )
        .bind(resource_id)
        .bind(connection_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every lock held by a connection (disconnect sweep).
    ///
    /// Returns the resource ids whose locks were deleted.
    pub async fn release_by_connection(
        pool: &PgPool,
        connection_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "DELETE FROM edit_locks \
             WHERE holder_connection_id = $1 \
             RETURNING resource_id",
        )
        .bind(connection_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(resource_id,)| resource_id).collect())
    }

    /// The active lock for a resource, or `None` if unlocked.
    pub async fn get_active(
        pool: &PgPool,
        resource_id: &str,
    ) -> Result<Option<EditLock>, sqlx::Error> {
        let query = format!("SELECT {LOCK_COLUMNS} FROM edit_locks WHERE resource_id = $1");
        sqlx::query_as::<_, EditLock>(&query)
            .bind(resource_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete the lock on a resource regardless of holder (administrative
    /// clear for orphaned locks). Returns `true` if a lock was deleted.
    pub async fn force_release(pool: &PgPool, resource_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM edit_locks WHERE resource_id = $1")
            .bind(resource_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
