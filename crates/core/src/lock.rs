//! Edit-lock records and the collaborator traits consumed by the lock
//! coordinator.
//!
//! The traits are the two seams of the coordination layer: [`LockStore`]
//! (persisted exclusive locks, one row per resource) and [`ContentSource`]
//! (the content store's read side, used to build reload payloads). The
//! Postgres implementations live in `copydesk-db`; tests substitute
//! in-memory implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::editor::EditorKind;
use crate::error::CoreError;
use crate::protocol::ContentPayload;
use crate::types::{ConnectionId, ResourceId, Timestamp};

// ---------------------------------------------------------------------------
// LockRecord
// ---------------------------------------------------------------------------

/// An active exclusive edit lock over one resource.
///
/// At most one record exists per `resource_id` at any time; a resource with
/// no record is unlocked. Records are never mutated in place -- there is no
/// lock transfer. A new holder waits for the old record's deletion and then
/// acquires fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockRecord {
    pub id: i64,
    pub resource_id: ResourceId,
    /// The WebSocket connection that holds the lock.
    pub holder_connection_id: ConnectionId,
    /// The authenticated identity (email) of the holder, for display.
    pub holder_identity: String,
    pub editor_kind: EditorKind,
    /// Populated only when `editor_kind` is `File`.
    pub file_path: Option<String>,
    pub acquired_at: Timestamp,
}

/// Parameters for a lock acquisition attempt.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    pub resource_id: ResourceId,
    pub connection_id: ConnectionId,
    pub identity: String,
    pub editor_kind: EditorKind,
    pub file_path: Option<String>,
}

/// Result of [`LockStore::try_acquire`].
///
/// Contention is not an error: when the resource is already locked by a
/// different connection the existing record is returned untouched so the
/// caller can render "locked by X".
#[derive(Debug, Clone)]
pub enum AcquireOutcome {
    /// The caller now holds the lock.
    Acquired(LockRecord),
    /// The resource was already locked; the pre-existing record is returned.
    Held(LockRecord),
}

impl AcquireOutcome {
    /// The lock record describing the resource's current holder, whichever
    /// side of the race the caller ended up on.
    pub fn record(&self) -> &LockRecord {
        match self {
            AcquireOutcome::Acquired(rec) | AcquireOutcome::Held(rec) => rec,
        }
    }
}

// ---------------------------------------------------------------------------
// LockStore
// ---------------------------------------------------------------------------

/// Persisted table of active locks behind atomic conditional writes.
///
/// Implementations must make each method atomic with respect to concurrent
/// calls for the same resource id (insert-if-absent, predicate delete), so
/// that two concurrent acquires can never both believe they won. No
/// serialization is required across different resource ids.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Atomically create a lock if the resource is unlocked.
    ///
    /// First acquirer wins; an existing lock is never displaced, not even
    /// by a repeat call from the current holder.
    async fn try_acquire(&self, request: &AcquireRequest) -> Result<AcquireOutcome, CoreError>;

    /// Delete the lock on `resource_id` if it is held by `connection_id`.
    ///
    /// Scoped to the caller's own lock: a lock held by a different
    /// connection is left untouched. Returns `true` if a lock was deleted.
    /// Releasing an unlocked resource is a no-op, not an error.
    async fn release(&self, resource_id: &str, connection_id: &str) -> Result<bool, CoreError>;

    /// Delete every lock held by `connection_id` (disconnect sweep).
    ///
    /// Returns the resource ids whose locks were deleted, so the caller can
    /// broadcast per-room cleanup. Idempotent: a second sweep for the same
    /// connection returns an empty list.
    async fn release_by_connection(
        &self,
        connection_id: &str,
    ) -> Result<Vec<ResourceId>, CoreError>;

    /// The active lock for a resource, or `None` if unlocked.
    async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, CoreError>;

    /// Administratively delete the lock on a resource regardless of holder.
    ///
    /// The escape hatch for orphaned locks whose holder vanished without a
    /// disconnect event. Returns `true` if a lock was deleted.
    async fn force_release(&self, resource_id: &str) -> Result<bool, CoreError>;
}

// ---------------------------------------------------------------------------
// ContentSource
// ---------------------------------------------------------------------------

/// Read side of the content store, consumed when building reload payloads.
///
/// Covers the database-backed kinds (`Article`, `Layout`, `Template`); raw
/// files are read from disk by the content fetch dispatcher and never reach
/// this trait.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a fresh serialized representation of a resource.
    ///
    /// `Ok(None)` means the resource no longer exists (deleted
    /// concurrently), a tolerated outcome that callers report as a
    /// "resource removed" signal rather than a failure.
    async fn fetch(
        &self,
        resource_id: &str,
        kind: EditorKind,
    ) -> Result<Option<ContentPayload>, CoreError>;
}
