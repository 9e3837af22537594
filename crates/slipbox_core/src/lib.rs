//! Core domain logic for Slipbox: a folder-tree note store with targeted
//! refresh signalling.
//!
//! The state layer keeps a lazily-expanded folder tree in sync with storage:
//! a mutation performed deep in the tree publishes one `FolderLocation` on
//! the shared refresh channel, and exactly the node owning that location
//! re-fetches its children.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod state;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::folder::{Folder, FolderId};
pub use model::note::{Note, NoteId, NoteStatus};
pub use repo::folder_repo::{
    FolderRepoError, FolderRepoResult, FolderRepository, SqliteFolderRepository,
};
pub use repo::note_repo::{NoteRepoError, NoteRepoResult, NoteRepository, SqliteNoteRepository};
pub use state::node::{FetchTicket, FolderNode};
pub use state::refresh::{FolderLocation, RefreshChannel, Subscription};
pub use state::row::{FolderCommandError, FolderRow};
pub use state::tree::FolderTree;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
