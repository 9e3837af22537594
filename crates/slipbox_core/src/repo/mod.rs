//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from the state-management layer.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`ParentNotFound`) in addition to
//!   DB transport errors.
//! - Updates and deletes of detached rows degrade to no-ops instead of
//!   failing; the caller observes them only through missing downstream
//!   effects.

pub mod folder_repo;
pub mod note_repo;
