//! REST endpoints for lock inspection and administration.
//!
//! The WebSocket channel is the normal path for lock operations; these
//! routes exist for dashboards and for operators clearing orphaned locks
//! whose holder vanished without a disconnect event.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/locks/{resource_id}
///
/// The current lock state of a resource. The wildcard segment allows
/// file-path resource ids containing slashes.
async fn get_lock_state(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let lock_state = state.coordinator.resource_state(&resource_id).await?;
    Ok(Json(DataResponse { data: lock_state }))
}

/// DELETE /api/v1/locks/{resource_id}
///
/// Force-clear the lock on a resource regardless of holder, broadcasting
/// `unlocked` to the room.
async fn force_clear_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let released = state.coordinator.force_clear(&resource_id).await?;
    if released {
        tracing::warn!(
            resource_id = %resource_id,
            cleared_by = %auth.identity,
            "Lock force-cleared via REST"
        );
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "released": released }),
    }))
}

/// Routes mounted at `/locks`.
///
/// ```text
/// GET    /{*resource_id}   -> get_lock_state
/// DELETE /{*resource_id}   -> force_clear_lock
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{*resource_id}",
        get(get_lock_state).delete(force_clear_lock),
    )
}
