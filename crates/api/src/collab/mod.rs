//! The collaborative-editing coordination layer.
//!
//! [`LockCoordinator`] is the lock state machine; [`ContentFetcher`]
//! resolves fresh content for reload broadcasts; [`ChatChannel`] relays
//! ephemeral chat/typing signals.

mod chat;
mod content;
mod coordinator;

pub use chat::ChatChannel;
pub use content::ContentFetcher;
pub use coordinator::LockCoordinator;
