use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use copydesk_core::error::CoreError;
use copydesk_core::protocol::{ClientMessage, ServerMessage};

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::encode;

/// Query parameters for the WebSocket upgrade request.
///
/// Browsers cannot set headers on WebSocket handshakes, so the JWT rides in
/// the query string instead of the Authorization header.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
}

/// HTTP handler that authenticates and upgrades the connection to WebSocket.
///
/// An invalid token rejects the request with 401 before the upgrade; after
/// the upgrade the connection is registered with the registry and managed
/// by two tasks (sender + receiver).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = validate_token(&query.token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims.sub)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the registry.
///   2. Spawns a sender task that forwards messages from the registry channel.
///   3. Dispatches inbound messages to the coordinator on the current task.
///   4. Runs disconnect cleanup (room memberships + held locks).
async fn handle_socket(socket: WebSocket, state: AppState, identity: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, identity = %identity, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.registry.add(conn_id.clone(), identity.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: decode and dispatch inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if let Err(e) = dispatch(&state, &conn_id, &identity, message).await {
                        // Resource-scoped failure: report to this one
                        // connection only, keep the socket open.
                        tracing::warn!(conn_id = %conn_id, error = %e, "Client operation failed");
                        if let Some(frame) = encode(&ServerMessage::Error {
                            message: e.to_string(),
                        }) {
                            state.registry.send_to(&conn_id, frame).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Malformed client message");
                    if let Some(frame) = encode(&ServerMessage::Error {
                        message: "Malformed message".to_string(),
                    }) {
                        state.registry.send_to(&conn_id, frame).await;
                    }
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: release held locks, clear memberships, abort sender task.
    state.coordinator.handle_disconnect(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Route one decoded client message to the coordinator or chat channel.
async fn dispatch(
    state: &AppState,
    conn_id: &str,
    identity: &str,
    message: ClientMessage,
) -> Result<(), CoreError> {
    match message {
        ClientMessage::JoinRoom {
            resource_id,
            editor_kind,
        } => {
            state
                .coordinator
                .join_room(conn_id, &resource_id, editor_kind)
                .await;
            Ok(())
        }
        ClientMessage::AcquireLock {
            resource_id,
            editor_kind,
        } => {
            state
                .coordinator
                .acquire_lock(conn_id, identity, &resource_id, editor_kind)
                .await
        }
        ClientMessage::ReleaseLock { resource_id } => {
            state.coordinator.release_lock(conn_id, &resource_id).await
        }
        ClientMessage::Saved {
            resource_id,
            editor_kind,
        } => state.coordinator.saved(conn_id, &resource_id, editor_kind).await,
        ClientMessage::Imported {
            resource_id,
            editor_kind,
        } => {
            state
                .coordinator
                .imported(conn_id, &resource_id, editor_kind)
                .await
        }
        ClientMessage::Abandoned {
            resource_id,
            editor_kind,
        } => {
            state
                .coordinator
                .abandoned(conn_id, &resource_id, editor_kind)
                .await
        }
        ClientMessage::ChatMessage { payload } => {
            state.chat.message(conn_id, identity, payload).await;
            Ok(())
        }
        ClientMessage::TypingStarted => {
            state.chat.typing_started(conn_id, identity).await;
            Ok(())
        }
        ClientMessage::TypingStopped => {
            state.chat.typing_stopped(conn_id, identity).await;
            Ok(())
        }
    }
}
