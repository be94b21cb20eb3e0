//! Row model for the `edit_locks` table.

use copydesk_core::editor::EditorKind;
use copydesk_core::error::CoreError;
use copydesk_core::lock::LockRecord;
use copydesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `edit_locks` table.
///
/// `editor_kind` is stored as text; [`EditLock::into_record`] parses it into
/// the domain enum when crossing into `copydesk-core` types.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditLock {
    pub id: DbId,
    pub resource_id: String,
    pub holder_connection_id: String,
    pub holder_identity: String,
    pub editor_kind: String,
    pub file_path: Option<String>,
    pub acquired_at: Timestamp,
}

impl EditLock {
    /// Convert into the domain-level [`LockRecord`].
    ///
    /// A non-parseable `editor_kind` means the table was written by
    /// something other than this service and is reported as an internal
    /// error rather than silently coerced.
    pub fn into_record(self) -> Result<LockRecord, CoreError> {
        let editor_kind: EditorKind = self
            .editor_kind
            .parse()
            .map_err(|e: String| CoreError::Internal(format!("Corrupt edit_locks row: {e}")))?;

        Ok(LockRecord {
            id: self.id,
            resource_id: self.resource_id,
            holder_connection_id: self.holder_connection_id,
            holder_identity: self.holder_identity,
            editor_kind,
            file_path: self.file_path,
            acquired_at: self.acquired_at,
        })
    }
}
