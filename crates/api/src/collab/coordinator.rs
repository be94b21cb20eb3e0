//! The lock state machine.
//!
//! Each resource is either `Unlocked` or `Locked(holder)`. All transitions
//! run through atomic conditional writes in the lock store, so two
//! concurrent acquires for the same resource can never both win; operations
//! on different resources proceed fully in parallel.
//!
//! Broadcast audiences follow the event semantics: a save excludes the
//! saving connection (it already has the content), an import includes it
//! (content was replaced out-of-band), an abandon reverts everyone to the
//! last-saved state.

use std::sync::Arc;

use copydesk_core::editor::EditorKind;
use copydesk_core::error::CoreError;
use copydesk_core::lock::{AcquireOutcome, AcquireRequest, LockStore};
use copydesk_core::protocol::{LockState, ServerMessage};

use crate::collab::content::ContentFetcher;
use crate::ws::{encode, ConnectionRegistry};

/// Coordinates exclusive edit locks and the broadcasts that keep every room
/// member's view of a resource current.
pub struct LockCoordinator {
    registry: Arc<ConnectionRegistry>,
    locks: Arc<dyn LockStore>,
    fetcher: ContentFetcher,
}

impl LockCoordinator {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        locks: Arc<dyn LockStore>,
        fetcher: ContentFetcher,
    ) -> Self {
        Self {
            registry,
            locks,
            fetcher,
        }
    }

    /// Subscribe a connection to a resource's room. No broadcast; joining
    /// grants visibility, not ownership.
    pub async fn join_room(&self, conn_id: &str, resource_id: &str, editor_kind: EditorKind) {
        self.registry.join(conn_id, resource_id).await;
        tracing::debug!(
            conn_id,
            resource_id,
            editor_kind = %editor_kind,
            "Joined editing room"
        );
    }

    /// Attempt to acquire the exclusive lock on a resource.
    ///
    /// First acquirer wins. Whether the caller won or the resource was
    /// already held by another connection, the room is notified with the
    /// current lock state so losers can render "locked by X" instead of an
    /// error.
    pub async fn acquire_lock(
        &self,
        conn_id: &str,
        identity: &str,
        resource_id: &str,
        editor_kind: EditorKind,
    ) -> Result<(), CoreError> {
        let request = AcquireRequest {
            resource_id: resource_id.to_string(),
            connection_id: conn_id.to_string(),
            identity: identity.to_string(),
            editor_kind,
            // For raw files the resource id doubles as the path.
            file_path: matches!(editor_kind, EditorKind::File)
                .then(|| resource_id.to_string()),
        };

        let outcome = self.locks.try_acquire(&request).await?;
        match &outcome {
            AcquireOutcome::Acquired(rec) => {
                tracing::info!(
                    conn_id,
                    resource_id,
                    holder = %rec.holder_identity,
                    editor_kind = %editor_kind,
                    "Lock acquired"
                );
            }
            AcquireOutcome::Held(rec) => {
                tracing::debug!(
                    conn_id,
                    resource_id,
                    holder = %rec.holder_identity,
                    "Lock already held"
                );
            }
        }

        self.broadcast_state(
            resource_id,
            LockState::from_record(Some(outcome.record())),
            None,
        )
        .await;
        Ok(())
    }

    /// Release the caller's lock on a resource and notify the room of the
    /// resulting state.
    ///
    /// Idempotent: releasing an unlocked resource (or one held by someone
    /// else) is a no-op that still reports the current state.
    pub async fn release_lock(&self, conn_id: &str, resource_id: &str) -> Result<(), CoreError> {
        self.release_and_notify(conn_id, resource_id, None).await
    }

    /// Content was saved: push fresh content and the resulting lock state
    /// to every *other* room member. The saver already has both and gets no
    /// echo.
    pub async fn saved(
        &self,
        conn_id: &str,
        resource_id: &str,
        editor_kind: EditorKind,
    ) -> Result<(), CoreError> {
        self.broadcast_reload(resource_id, editor_kind, Some(conn_id))
            .await?;
        self.release_and_notify(conn_id, resource_id, Some(conn_id))
            .await
    }

    /// Content was replaced out-of-band (bulk import): push fresh content
    /// to *every* room member including the sender, then release the lock.
    pub async fn imported(
        &self,
        conn_id: &str,
        resource_id: &str,
        editor_kind: EditorKind,
    ) -> Result<(), CoreError> {
        self.broadcast_reload(resource_id, editor_kind, None).await?;
        self.release_and_notify(conn_id, resource_id, None).await
    }

    /// Edits were discarded: push the last-saved content to every room
    /// member so open editors revert, then release the lock.
    pub async fn abandoned(
        &self,
        conn_id: &str,
        resource_id: &str,
        editor_kind: EditorKind,
    ) -> Result<(), CoreError> {
        self.broadcast_reload(resource_id, editor_kind, None).await?;
        self.release_and_notify(conn_id, resource_id, None).await
    }

    /// Delete the caller's lock (if it holds one) and broadcast the
    /// resulting state to the room, minus the optional exclusion.
    ///
    /// The state is re-read after the delete rather than assumed unlocked:
    /// a release against a resource locked by someone else is a no-op and
    /// the room is told who still holds it.
    async fn release_and_notify(
        &self,
        conn_id: &str,
        resource_id: &str,
        exclude: Option<&str>,
    ) -> Result<(), CoreError> {
        let released = self.locks.release(resource_id, conn_id).await?;
        if released {
            tracing::info!(conn_id, resource_id, "Lock released");
        }
        let state = LockState::from_record(self.locks.get(resource_id).await?.as_ref());
        self.broadcast_state(resource_id, state, exclude).await;
        Ok(())
    }

    /// Disconnect cleanup: delete every lock the connection held and
    /// broadcast `unlocked` to each affected room, then clear memberships.
    ///
    /// Idempotent, so it also covers a disconnect that preempts an
    /// in-flight acquire: whichever runs last still sees and removes the
    /// lock. Never fails the caller; storage errors are logged and the
    /// locks become orphans recoverable via the administrative clear.
    pub async fn handle_disconnect(&self, conn_id: &str) {
        let rooms = self.registry.on_disconnect(conn_id).await;
        tracing::debug!(conn_id, room_count = rooms.len(), "Cleared room memberships");

        match self.locks.release_by_connection(conn_id).await {
            Ok(resources) => {
                for resource_id in resources {
                    tracing::info!(conn_id, resource_id = %resource_id, "Lock released on disconnect");
                    self.broadcast_state(&resource_id, LockState::Unlocked, None)
                        .await;
                }
            }
            Err(e) => {
                tracing::error!(conn_id, error = %e, "Disconnect lock sweep failed");
            }
        }
    }

    /// The current lock state of a resource (REST status endpoint).
    pub async fn resource_state(&self, resource_id: &str) -> Result<LockState, CoreError> {
        Ok(LockState::from_record(
            self.locks.get(resource_id).await?.as_ref(),
        ))
    }

    /// Administratively clear the lock on a resource regardless of holder
    /// and notify the room. The escape hatch for orphaned locks.
    pub async fn force_clear(&self, resource_id: &str) -> Result<bool, CoreError> {
        let released = self.locks.force_release(resource_id).await?;
        if released {
            tracing::warn!(resource_id, "Lock force-cleared");
            self.broadcast_state(resource_id, LockState::Unlocked, None)
                .await;
        }
        Ok(released)
    }

    /// Fetch fresh content and broadcast it as a reload; a concurrently
    /// deleted resource broadcasts a removal signal instead.
    async fn broadcast_reload(
        &self,
        resource_id: &str,
        editor_kind: EditorKind,
        exclude: Option<&str>,
    ) -> Result<(), CoreError> {
        let message = match self.fetcher.fetch(resource_id, editor_kind).await? {
            Some(content) => ServerMessage::Reload {
                resource_id: resource_id.to_string(),
                content,
            },
            None => {
                tracing::debug!(resource_id, "Resource gone, broadcasting removal");
                ServerMessage::Removed {
                    resource_id: resource_id.to_string(),
                }
            }
        };

        if let Some(frame) = encode(&message) {
            self.registry
                .broadcast_to_room(resource_id, frame, exclude)
                .await;
        }
        Ok(())
    }

    async fn broadcast_state(&self, resource_id: &str, state: LockState, exclude: Option<&str>) {
        let message = ServerMessage::LockState {
            resource_id: resource_id.to_string(),
            state,
        };
        if let Some(frame) = encode(&message) {
            self.registry
                .broadcast_to_room(resource_id, frame, exclude)
                .await;
        }
    }
}
