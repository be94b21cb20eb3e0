//! Copydesk coordination API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! WebSocket layer, and the lock coordinator) so integration tests and the
//! binary entrypoint can both access them.

pub mod auth;
pub mod collab;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod ws;
