//! WebSocket wire protocol for the collaborative-editing channel.
//!
//! All messages are JSON with an internally-tagged `"type"` discriminator
//! (dot-separated names) so the frontend can route by type string.
//! Client-to-server messages drive the lock state machine; server-to-client
//! messages are either room-scoped (lock state, reloads) or hub-wide (chat
//! and typing signals).

use serde::{Deserialize, Serialize};

use crate::editor::EditorKind;
use crate::lock::LockRecord;
use crate::types::ResourceId;

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// Messages a browser client sends over its WebSocket connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Subscribe to updates about one resource. Joining the room is a
    /// prerequisite to acquiring the lock for that resource.
    #[serde(rename = "room.join")]
    JoinRoom {
        resource_id: ResourceId,
        editor_kind: EditorKind,
    },

    /// Announce intent to edit: attempt to acquire the exclusive lock.
    #[serde(rename = "lock.acquire")]
    AcquireLock {
        resource_id: ResourceId,
        editor_kind: EditorKind,
    },

    /// Give up the lock without saving.
    #[serde(rename = "lock.release")]
    ReleaseLock { resource_id: ResourceId },

    /// Content was saved; other room members should reload it.
    #[serde(rename = "content.saved")]
    Saved {
        resource_id: ResourceId,
        editor_kind: EditorKind,
    },

    /// Content was replaced out-of-band (bulk import); every room member
    /// including the sender should reload.
    #[serde(rename = "content.imported")]
    Imported {
        resource_id: ResourceId,
        editor_kind: EditorKind,
    },

    /// Edits were discarded; every room member reloads the last-saved state.
    #[serde(rename = "content.abandoned")]
    Abandoned {
        resource_id: ResourceId,
        editor_kind: EditorKind,
    },

    /// Ephemeral chat message, relayed hub-wide to everyone else.
    #[serde(rename = "chat.message")]
    ChatMessage { payload: serde_json::Value },

    /// The user started typing in the chat box.
    #[serde(rename = "chat.typing_started")]
    TypingStarted,

    /// The user stopped typing.
    #[serde(rename = "chat.typing_stopped")]
    TypingStopped,
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

/// Messages the server pushes to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Room-scoped: the current lock state of a resource.
    #[serde(rename = "lock.state")]
    LockState {
        resource_id: ResourceId,
        state: LockState,
    },

    /// Room-scoped: fresh content, pushed so open editors reload.
    #[serde(rename = "content.reload")]
    Reload {
        resource_id: ResourceId,
        content: ContentPayload,
    },

    /// Room-scoped: the resource no longer exists; sent in place of a
    /// reload when a concurrent delete won the race.
    #[serde(rename = "content.removed")]
    Removed { resource_id: ResourceId },

    /// Hub-wide: a chat message from another user.
    #[serde(rename = "chat.message")]
    ChatMessage {
        sender: String,
        payload: serde_json::Value,
    },

    /// Hub-wide: another user started typing.
    #[serde(rename = "chat.typing_started")]
    TypingStarted { sender: String },

    /// Hub-wide: another user stopped typing.
    #[serde(rename = "chat.typing_stopped")]
    TypingStopped { sender: String },

    /// Sent only to the requesting connection when its operation failed.
    #[serde(rename = "error")]
    Error { message: String },
}

// ---------------------------------------------------------------------------
// LockState
// ---------------------------------------------------------------------------

/// Lock state of one resource as rendered to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LockState {
    /// Someone holds the lock; the UI disables editing and shows who.
    Locked {
        holder_identity: String,
        editor_kind: EditorKind,
    },
    /// No one holds the lock.
    Unlocked,
}

impl LockState {
    /// Render a lock-store lookup as client-facing state.
    pub fn from_record(record: Option<&LockRecord>) -> Self {
        match record {
            Some(rec) => LockState::Locked {
                holder_identity: rec.holder_identity.clone(),
                editor_kind: rec.editor_kind,
            },
            None => LockState::Unlocked,
        }
    }
}

// ---------------------------------------------------------------------------
// ContentPayload
// ---------------------------------------------------------------------------

/// Serialized resource content carried by a reload broadcast.
///
/// One variant per editor kind; the structured bodies come from the content
/// store's serializers, the file variant is read straight from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentPayload {
    /// Edit-mode article representation: content, metadata, permissions.
    Article { body: serde_json::Value },
    /// Full layout record.
    Layout { body: serde_json::Value },
    /// Full template record.
    Template { body: serde_json::Value },
    /// Raw file contents.
    File {
        path: String,
        display_name: String,
        text: String,
    },
}

impl ContentPayload {
    /// The editor kind this payload belongs to.
    pub fn kind(&self) -> EditorKind {
        match self {
            ContentPayload::Article { .. } => EditorKind::Article,
            ContentPayload::Layout { .. } => EditorKind::Layout,
            ContentPayload::Template { .. } => EditorKind::Template,
            ContentPayload::File { .. } => EditorKind::File,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
