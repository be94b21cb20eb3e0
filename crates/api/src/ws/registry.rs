//! Connection and room registry.
//!
//! Tracks every live WebSocket connection and its room memberships. Room
//! name equals resource id; membership controls only message fan-out, never
//! lock ownership. Membership is added by explicit join and removed when
//! the connection closes.

use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use copydesk_core::types::{ConnectionId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
struct Connection {
    /// Authenticated identity (email) of the connected user.
    identity: String,
    /// Channel sender for outbound messages to this connection.
    sender: WsSender,
    /// When this connection was established.
    #[allow(dead_code)]
    connected_at: Timestamp,
    /// Rooms this connection has joined.
    rooms: HashSet<String>,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<ConnectionId, Connection>,
    /// Reverse index: room name -> member connection ids.
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

/// Manages all active WebSocket connections and their room memberships.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. The membership maps are mutated only by
/// the transport layer (join/leave/disconnect); the lock coordinator just
/// broadcasts through them.
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
}

impl ConnectionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: ConnectionId,
        identity: String,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection {
            identity,
            sender: tx,
            connected_at: chrono::Utc::now(),
            rooms: HashSet::new(),
        };
        self.inner.write().await.connections.insert(conn_id, conn);
        rx
    }

    /// The identity of a connection, if it is still registered.
    pub async fn identity_of(&self, conn_id: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .connections
            .get(conn_id)
            .map(|c| c.identity.clone())
    }

    /// Add a connection to a room. Idempotent; unknown connections are
    /// ignored (the socket raced its own close).
    pub async fn join(&self, conn_id: &str, room: &str) {
        let mut inner = self.inner.write().await;
        let Some(conn) = inner.connections.get_mut(conn_id) else {
            tracing::debug!(conn_id, room, "Join from unknown connection ignored");
            return;
        };
        conn.rooms.insert(room.to_string());
        inner
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Remove a connection from a room. Idempotent; no error if absent.
    pub async fn leave(&self, conn_id: &str, room: &str) {
        let mut inner = self.inner.write().await;
        if let Some(conn) = inner.connections.get_mut(conn_id) {
            conn.rooms.remove(room);
        }
        if let Some(members) = inner.rooms.get_mut(room) {
            members.remove(conn_id);
            if members.is_empty() {
                inner.rooms.remove(room);
            }
        }
    }

    /// Deliver a message to every current member of a room, optionally
    /// excluding one connection (typically the sender).
    ///
    /// Fire-and-forget: a closed member channel is skipped and never blocks
    /// delivery to the rest.
    pub async fn broadcast_to_room(&self, room: &str, message: Message, exclude: Option<&str>) {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room) else {
            return;
        };
        for member_id in members {
            if Some(member_id.as_str()) == exclude {
                continue;
            }
            if let Some(conn) = inner.connections.get(member_id) {
                let _ = conn.sender.send(message.clone());
            }
        }
    }

    /// Deliver a message to every connection, optionally excluding one.
    /// Used by the hub-wide chat/presence channel.
    pub async fn broadcast_all(&self, message: Message, exclude: Option<&str>) {
        let inner = self.inner.read().await;
        for (conn_id, conn) in &inner.connections {
            if Some(conn_id.as_str()) == exclude {
                continue;
            }
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Send a message to one connection. Returns `false` if the connection
    /// is gone or its channel is closed.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        let inner = self.inner.read().await;
        match inner.connections.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Remove a connection and clear its room memberships.
    ///
    /// Returns every room the connection belonged to, so the caller can run
    /// per-room cleanup. A second call for the same connection returns an
    /// empty list.
    pub async fn on_disconnect(&self, conn_id: &str) -> Vec<String> {
        let mut inner = self.inner.write().await;
        let Some(conn) = inner.connections.remove(conn_id) else {
            return Vec::new();
        };
        let mut rooms: Vec<String> = conn.rooms.into_iter().collect();
        rooms.sort();
        for room in &rooms {
            if let Some(members) = inner.rooms.get_mut(room) {
                members.remove(conn_id);
                if members.is_empty() {
                    inner.rooms.remove(room);
                }
            }
        }
        rooms
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Return the current number of members in a room.
    pub async fn room_size(&self, room: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .map_or(0, |members| members.len())
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let inner = self.inner.read().await;
        for conn in inner.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every connection, then clear all state.
    ///
    /// Used during graceful shutdown to notify clients before the server
    /// stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.connections.len();
        for conn in inner.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        inner.connections.clear();
        inner.rooms.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
