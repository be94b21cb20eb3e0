//! Editor kinds: the content-type tag carried by rooms, locks, and reload
//! payloads.
//!
//! The kind selects which content adapter resolves fresh content when a
//! save/import/abandon event needs to broadcast a reload. The lock state
//! machine itself treats every kind identically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four editable content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// A CMS article, resolved through the edit-mode accessor.
    Article,
    /// A page layout record.
    Layout,
    /// A rendering template record.
    Template,
    /// A raw file on disk; the resource id doubles as the file path.
    File,
}

impl EditorKind {
    /// The canonical lowercase name, matching the wire representation and
    /// the `editor_kind` column in the lock table.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorKind::Article => "article",
            EditorKind::Layout => "layout",
            EditorKind::Template => "template",
            EditorKind::File => "file",
        }
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(EditorKind::Article),
            "layout" => Ok(EditorKind::Layout),
            "template" => Ok(EditorKind::Template),
            "file" => Ok(EditorKind::File),
            other => Err(format!(
                "Invalid editor kind '{other}'. Must be one of: article, layout, template, file"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
