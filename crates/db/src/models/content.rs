//! Row models for the content collections read by the fetch adapters.

use copydesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `articles` table, in its edit-mode shape: full content
/// plus the metadata and permissions an open editor needs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub body: serde_json::Value,
    pub metadata: serde_json::Value,
    pub permissions: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `layouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Layout {
    pub id: DbId,
    pub name: String,
    pub definition: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub markup: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
