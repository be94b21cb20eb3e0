//! WebSocket infrastructure for the collaborative-editing channel.
//!
//! Provides the connection/room registry, heartbeat monitoring, and the
//! HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod registry;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use registry::ConnectionRegistry;

use axum::extract::ws::Message;
use copydesk_core::protocol::ServerMessage;

/// Encode a server message as a WebSocket text frame.
///
/// Serialization of these types cannot realistically fail; if it ever does
/// the message is dropped and logged rather than taking the connection down.
pub(crate) fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode server message");
            None
        }
    }
}
