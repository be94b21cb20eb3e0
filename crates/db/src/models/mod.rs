//! Database row models.

pub mod content;
pub mod lock;
