//! Domain-level error type shared across the workspace.

/// Errors produced by domain logic and the collaborator seams.
///
/// Resource-scoped conditions (`NotFound`, `Conflict`) are normal outcomes
/// for the coordination layer and are reported back to the requesting
/// client, never escalated process-wide.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup came back empty.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backing store failed. The effect of the attempted write is
    /// unknown, so callers must not retry non-idempotent operations.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An invariant was violated or an unclassified failure occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}
