//! Folder hierarchy state-synchronization layer.
//!
//! # Responsibility
//! - Keep the materialized folder tree in sync with storage after mutations,
//!   without reloading the whole tree.
//! - Route "children of X are stale" signals to exactly the node that owns X.
//!
//! # Invariants
//! - Storage is the single source of truth: mutations never write into
//!   in-memory child lists directly; node lists change only through
//!   refresh-triggered re-fetches.
//! - Refresh handling is idempotent under duplicate signal delivery.
//! - A merge never recreates a node that is still present; expand state and
//!   loaded subtrees survive refreshes.

pub mod node;
pub mod refresh;
pub mod row;
pub mod tree;
