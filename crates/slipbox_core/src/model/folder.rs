//! Folder domain model.
//!
//! # Invariants
//! - `id` is stable and never reused for another folder.
//! - `created_at` is assigned once at creation and never changes.
//! - Child listings are ordered by `created_at` ascending; ties keep
//!   insertion order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one folder.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type FolderId = Uuid;

/// Read model for one folder row.
///
/// The parent/child relationship is held as an id reference rather than an
/// owned link; the storage schema keeps both sides consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Stable folder id.
    pub id: FolderId,
    /// User-facing folder name.
    pub name: String,
    /// Parent folder id. `None` means root-level.
    pub parent_id: Option<FolderId>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

impl Folder {
    /// Returns whether this folder sits at the top level of the tree.
    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::Folder;
    use uuid::Uuid;

    #[test]
    fn root_level_is_derived_from_missing_parent() {
        let folder = Folder {
            id: Uuid::new_v4(),
            name: "Inbox".to_string(),
            parent_id: None,
            created_at: 0,
        };
        assert!(folder.is_root_level());

        let child = Folder {
            parent_id: Some(folder.id),
            ..folder.clone()
        };
        assert!(!child.is_root_level());
    }

    #[test]
    fn folder_serializes_with_stable_field_names() {
        let folder = Folder {
            id: Uuid::nil(),
            name: "Inbox".to_string(),
            parent_id: None,
            created_at: 42,
        };
        let json = serde_json::to_value(&folder).expect("folder should serialize");
        assert_eq!(json["name"], "Inbox");
        assert_eq!(json["created_at"], 42);
        assert!(json["parent_id"].is_null());
    }
}
