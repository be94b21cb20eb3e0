//! Shared test fixtures: in-memory implementations of the collaborator
//! traits and helpers for reading broadcast frames back as protocol
//! messages.

// Each test binary compiles this module separately and uses a subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::ws::Message;
use tokio::sync::mpsc::UnboundedReceiver;

use copydesk_core::editor::EditorKind;
use copydesk_core::error::CoreError;
use copydesk_core::lock::{
    AcquireOutcome, AcquireRequest, ContentSource, LockRecord, LockStore,
};
use copydesk_core::protocol::{ContentPayload, ServerMessage};

// ---------------------------------------------------------------------------
// InMemoryLockStore
// ---------------------------------------------------------------------------

/// `LockStore` over a mutex-guarded map.
///
/// The map entry API gives the same insert-if-absent atomicity the Postgres
/// implementation gets from its unique constraint.
#[derive(Default)]
pub struct InMemoryLockStore {
    locks: Mutex<HashMap<String, LockRecord>>,
    next_id: AtomicI64,
}

impl InMemoryLockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn try_acquire(&self, request: &AcquireRequest) -> Result<AcquireOutcome, CoreError> {
        let mut locks = self.locks.lock().unwrap();
        if let Some(existing) = locks.get(&request.resource_id) {
            return Ok(AcquireOutcome::Held(existing.clone()));
        }
        let record = LockRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            resource_id: request.resource_id.clone(),
            holder_connection_id: request.connection_id.clone(),
            holder_identity: request.identity.clone(),
            editor_kind: request.editor_kind,
            file_path: request.file_path.clone(),
            acquired_at: chrono::Utc::now(),
        };
        locks.insert(request.resource_id.clone(), record.clone());
        Ok(AcquireOutcome::Acquired(record))
    }

    async fn release(&self, resource_id: &str, connection_id: &str) -> Result<bool, CoreError> {
        let mut locks = self.locks.lock().unwrap();
        match locks.get(resource_id) {
            Some(rec) if rec.holder_connection_id == connection_id => {
                locks.remove(resource_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_by_connection(
        &self,
        connection_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let mut locks = self.locks.lock().unwrap();
        let mut released: Vec<String> = locks
            .values()
            .filter(|rec| rec.holder_connection_id == connection_id)
            .map(|rec| rec.resource_id.clone())
            .collect();
        for resource_id in &released {
            locks.remove(resource_id);
        }
        released.sort();
        Ok(released)
    }

    async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, CoreError> {
        Ok(self.locks.lock().unwrap().get(resource_id).cloned())
    }

    async fn force_release(&self, resource_id: &str) -> Result<bool, CoreError> {
        Ok(self.locks.lock().unwrap().remove(resource_id).is_some())
    }
}

// ---------------------------------------------------------------------------
// InMemoryContentSource
// ---------------------------------------------------------------------------

/// `ContentSource` over a seeded map, keyed by (resource id, kind).
#[derive(Default)]
pub struct InMemoryContentSource {
    items: Mutex<HashMap<(String, EditorKind), ContentPayload>>,
}

impl InMemoryContentSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, resource_id: &str, kind: EditorKind, payload: ContentPayload) {
        self.items
            .lock()
            .unwrap()
            .insert((resource_id.to_string(), kind), payload);
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn fetch(
        &self,
        resource_id: &str,
        kind: EditorKind,
    ) -> Result<Option<ContentPayload>, CoreError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&(resource_id.to_string(), kind))
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Frame helpers
// ---------------------------------------------------------------------------

/// Decode a text frame back into a protocol message.
pub fn decode(message: Message) -> ServerMessage {
    match message {
        Message::Text(text) => {
            serde_json::from_str(&text).expect("Frame should decode as ServerMessage")
        }
        other => panic!("Expected text frame, got: {other:?}"),
    }
}

/// Pop the next already-delivered frame, if any. Coordinator operations
/// complete their broadcasts before returning, so `try_recv` is
/// deterministic here.
pub fn next_message(rx: &mut UnboundedReceiver<Message>) -> Option<ServerMessage> {
    rx.try_recv().ok().map(decode)
}

/// Assert a receiver got nothing.
pub fn assert_silent(rx: &mut UnboundedReceiver<Message>) {
    if let Ok(message) = rx.try_recv() {
        panic!("Expected no message, got: {message:?}");
    }
}
