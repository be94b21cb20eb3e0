/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Opaque identifier of an editable resource.
///
/// Depending on the editor kind this is an article record id, a layout id,
/// a template id, or a relative file path. The coordination layer never
/// interprets it beyond equality; the room name for a resource is the
/// resource id itself.
pub type ResourceId = String;

/// Identifier of a single WebSocket connection (UUID v4, assigned at upgrade).
pub type ConnectionId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
