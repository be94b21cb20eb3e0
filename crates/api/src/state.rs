use std::sync::Arc;

use crate::collab::{ChatChannel, LockCoordinator};
use crate::config::ServerConfig;
use crate::ws::ConnectionRegistry;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: copydesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection and room registry.
    pub registry: Arc<ConnectionRegistry>,
    /// The lock state machine.
    pub coordinator: Arc<LockCoordinator>,
    /// Stateless chat/presence pass-through.
    pub chat: Arc<ChatChannel>,
}
