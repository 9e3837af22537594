//! Domain model for the folder hierarchy and its notes.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and the state layer.
//!
//! # Invariants
//! - Every domain object is identified by a stable uuid.
//! - A folder with `parent_id = None` is a root-level folder.

pub mod folder;
pub mod note;
