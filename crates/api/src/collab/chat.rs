//! Stateless chat/presence pass-through.
//!
//! Relays chat messages and typing signals hub-wide to everyone except the
//! sender, tagged with the sender's identity. No state, no persistence,
//! deliberately separate from the lock store.

use std::sync::Arc;

use copydesk_core::protocol::ServerMessage;

use crate::ws::{encode, ConnectionRegistry};

/// Broadcast relay for ephemeral chat and typing signals.
pub struct ChatChannel {
    registry: Arc<ConnectionRegistry>,
}

impl ChatChannel {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Relay a chat message to everyone else.
    pub async fn message(&self, conn_id: &str, sender: &str, payload: serde_json::Value) {
        self.relay(
            conn_id,
            ServerMessage::ChatMessage {
                sender: sender.to_string(),
                payload,
            },
        )
        .await;
    }

    /// Relay a typing-started signal to everyone else.
    pub async fn typing_started(&self, conn_id: &str, sender: &str) {
        self.relay(
            conn_id,
            ServerMessage::TypingStarted {
                sender: sender.to_string(),
            },
        )
        .await;
    }

    /// Relay a typing-stopped signal to everyone else.
    pub async fn typing_stopped(&self, conn_id: &str, sender: &str) {
        self.relay(
            conn_id,
            ServerMessage::TypingStopped {
                sender: sender.to_string(),
            },
        )
        .await;
    }

    async fn relay(&self, conn_id: &str, message: ServerMessage) {
        if let Some(frame) = encode(&message) {
            self.registry.broadcast_all(frame, Some(conn_id)).await;
        }
    }
}
