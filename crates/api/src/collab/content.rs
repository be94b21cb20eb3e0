//! Content fetch dispatcher.
//!
//! Given a resource id and an editor kind, resolves a fresh serialized
//! representation for reload broadcasts. Database-backed kinds go through
//! the `ContentSource` seam; raw files are read from disk under the
//! configured content root.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use copydesk_core::editor::EditorKind;
use copydesk_core::error::CoreError;
use copydesk_core::lock::ContentSource;
use copydesk_core::protocol::ContentPayload;

/// Dispatches content fetches to the adapter for each editor kind.
pub struct ContentFetcher {
    source: Arc<dyn ContentSource>,
    file_root: PathBuf,
}

impl ContentFetcher {
    pub fn new(source: Arc<dyn ContentSource>, file_root: PathBuf) -> Self {
        Self { source, file_root }
    }

    /// Fetch fresh content for a resource.
    ///
    /// `Ok(None)` means the resource no longer exists -- a normal outcome
    /// when a delete raced the edit session.
    pub async fn fetch(
        &self,
        resource_id: &str,
        kind: EditorKind,
    ) -> Result<Option<ContentPayload>, CoreError> {
        match kind {
            EditorKind::File => self.read_file(resource_id).await,
            _ => self.source.fetch(resource_id, kind).await,
        }
    }

    /// Read a raw-file resource; the resource id doubles as the path,
    /// relative to the content root.
    async fn read_file(&self, resource_id: &str) -> Result<Option<ContentPayload>, CoreError> {
        let relative = Path::new(resource_id);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(CoreError::Validation(format!(
                "File path '{resource_id}' escapes the content root"
            )));
        }

        let full_path = self.file_root.join(relative);
        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => {
                let display_name = relative
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(resource_id)
                    .to_string();
                Ok(Some(ContentPayload::File {
                    path: resource_id.to_string(),
                    display_name,
                    text,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Storage(format!(
                "Failed to read file '{resource_id}': {e}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
