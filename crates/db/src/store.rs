//! Postgres implementations of the coordination-layer collaborator traits.
//!
//! [`PgLockStore`] maps the `LockStore` trait onto the conditional writes in
//! [`EditLockRepo`]; [`PgContentSource`] maps `ContentSource` onto the
//! content repositories. Both are thin: atomicity lives in the SQL, and the
//! only logic here is error classification and row-to-domain conversion.

use async_trait::async_trait;
use copydesk_core::editor::EditorKind;
use copydesk_core::error::CoreError;
use copydesk_core::lock::{AcquireOutcome, AcquireRequest, ContentSource, LockRecord, LockStore};
use copydesk_core::protocol::ContentPayload;
use copydesk_core::types::{DbId, ResourceId};

use crate::repositories::{ArticleRepo, EditLockRepo, LayoutRepo, TemplateRepo};
use crate::DbPool;

/// Classify a sqlx failure as a storage error.
///
/// The effect of a failed write is uncertain, so nothing here retries;
/// reads are retried by callers where idempotence allows.
fn storage_error(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

// ---------------------------------------------------------------------------
// PgLockStore
// ---------------------------------------------------------------------------

/// `LockStore` backed by the `edit_locks` table.
#[derive(Clone)]
pub struct PgLockStore {
    pool: DbPool,
}

impl PgLockStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockStore for PgLockStore {
    async fn try_acquire(&self, request: &AcquireRequest) -> Result<AcquireOutcome, CoreError> {
        // Insert-if-absent, then a read on conflict. The read can come back
        // empty if the conflicting lock was released in between, in which
        // case one more insert attempt settles the race.
        for _ in 0..2 {
            if let Some(row) = EditLockRepo::acquire(&self.pool, request)
                .await
                .map_err(storage_error)?
            {
                return Ok(AcquireOutcome::Acquired(row.into_record()?));
            }

            if let Some(row) = EditLockRepo::get_active(&self.pool, &request.resource_id)
                .await
                .map_err(storage_error)?
            {
                return Ok(AcquireOutcome::Held(row.into_record()?));
            }

            tracing::debug!(
                resource_id = %request.resource_id,
                "Lock conflict raced with a release, retrying acquire"
            );
        }

        Err(CoreError::Internal(
            "Lock conflict detected but no active lock found".into(),
        ))
    }

    async fn release(&self, resource_id: &str, connection_id: &str) -> Result<bool, CoreError> {
        EditLockRepo::release(&self.pool, resource_id, connection_id)
            .await
            .map_err(storage_error)
    }

    async fn release_by_connection(
        &self,
        connection_id: &str,
    ) -> Result<Vec<ResourceId>, CoreError> {
        EditLockRepo::release_by_connection(&self.pool, connection_id)
            .await
            .map_err(storage_error)
    }

    async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, CoreError> {
        match EditLockRepo::get_active(&self.pool, resource_id)
            .await
            .map_err(storage_error)?
        {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    async fn force_release(&self, resource_id: &str) -> Result<bool, CoreError> {
        EditLockRepo::force_release(&self.pool, resource_id)
            .await
            .map_err(storage_error)
    }
}

// ---------------------------------------------------------------------------
// PgContentSource
// ---------------------------------------------------------------------------

/// `ContentSource` backed by the content collections.
///
/// Resource ids for database-backed kinds are stringified record ids; a
/// malformed id is a validation error, a missing row is `Ok(None)`.
#[derive(Clone)]
pub struct PgContentSource {
    pool: DbPool,
}

impl PgContentSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn parse_id(resource_id: &str) -> Result<DbId, CoreError> {
        resource_id.parse::<DbId>().map_err(|_| {
            CoreError::Validation(format!(
                "Resource id '{resource_id}' is not a valid record id"
            ))
        })
    }
}

#[async_trait]
impl ContentSource for PgContentSource {
    async fn fetch(
        &self,
        resource_id: &str,
        kind: EditorKind,
    ) -> Result<Option<ContentPayload>, CoreError> {
        let id = Self::parse_id(resource_id)?;

        let payload = match kind {
            EditorKind::Article => ArticleRepo::find_for_edit(&self.pool, id)
                .await
                .map_err(storage_error)?
                .map(|article| ContentPayload::Article {
                    body: serde_json::to_value(article).unwrap_or_default(),
                }),
            EditorKind::Layout => LayoutRepo::find_by_id(&self.pool, id)
                .await
                .map_err(storage_error)?
                .map(|layout| ContentPayload::Layout {
                    body: serde_json::to_value(layout).unwrap_or_default(),
                }),
            EditorKind::Template => TemplateRepo::find_by_id(&self.pool, id)
                .await
                .map_err(storage_error)?
                .map(|template| ContentPayload::Template {
                    body: serde_json::to_value(template).unwrap_or_default(),
                }),
            EditorKind::File => {
                // File content is read from disk by the fetch dispatcher.
                return Err(CoreError::Internal(
                    "File resources are not resolved through the content store".into(),
                ));
            }
        };

        Ok(payload)
    }
}
