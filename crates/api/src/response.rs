//! Shared response envelope for REST handlers.
//!
//! All REST responses use a `{ "data": ... }` envelope; use [`DataResponse`]
//! rather than ad-hoc `serde_json::json!` so the shape stays consistent.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
