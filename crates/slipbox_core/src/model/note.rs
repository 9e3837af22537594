//! Note domain model.
//!
//! # Invariants
//! - Every note belongs to exactly one folder.
//! - `status` defaults to `Draft` at creation.
//! - `body_text` is the plain-text projection kept lowercase for search.

use crate::model::folder::FolderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one note.
pub type NoteId = Uuid;

/// Editorial lifecycle state of a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    /// Freshly created, still being written.
    #[default]
    Draft,
    /// Waiting for a second pass.
    Review,
    /// Kept for reference only.
    Archived,
}

impl NoteStatus {
    /// Returns the canonical storage value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Archived => "archived",
        }
    }

    /// Parses a persisted status value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "review" => Some(Self::Review),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Read model for one note row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable note id.
    pub id: NoteId,
    /// User-facing title.
    pub title: String,
    /// Plain-text body projection.
    pub body_text: String,
    /// Editorial status.
    pub status: NoteStatus,
    /// Owning folder id.
    pub folder_id: FolderId,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}
