//! Copydesk domain crate.
//!
//! This crate has zero internal dependencies so that the API layer, the
//! persistence layer, and any future worker tooling can all reference the
//! same editor kinds, lock types, wire protocol, and collaborator traits.

pub mod editor;
pub mod error;
pub mod lock;
pub mod protocol;
pub mod types;
