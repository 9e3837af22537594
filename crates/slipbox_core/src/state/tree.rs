//! Root-level folder tree controller.
//!
//! # Responsibility
//! - Own the top-level folder node list.
//! - Rebuild it on root-targeted refresh signals with the same merge rule the
//!   nodes use.
//!
//! # Invariants
//! - The controller behaves as the tree's implicit root node: always
//!   "expanded", identity `FolderLocation::Root`.
//! - The first `process_signals` pass after construction performs the initial
//!   top-level load (the subscription is seeded with a root signal).
//! - An empty fetch result clears the list entirely.

use crate::model::folder::{Folder, FolderId};
use crate::repo::folder_repo::{FolderRepoError, FolderRepository};
use crate::state::node::{merge_child_nodes, FolderNode};
use crate::state::refresh::{FolderLocation, RefreshChannel, Subscription};
use crate::state::row::{create_folder, FolderCommandError};

/// Aggregates the top-level folder nodes and drives signal processing.
pub struct FolderTree {
    channel: RefreshChannel,
    subscription: Subscription,
    nodes: Vec<FolderNode>,
}

impl FolderTree {
    /// Creates a tree controller bound to one refresh channel.
    ///
    /// The root subscription is seeded so that the first call to
    /// [`FolderTree::process_signals`] loads the top-level folders.
    pub fn new(channel: RefreshChannel) -> Self {
        let subscription = channel
            .subscribe(FolderLocation::Root)
            .prepend(FolderLocation::Root);
        Self {
            channel,
            subscription,
            nodes: Vec::new(),
        }
    }

    /// Returns the materialized top-level nodes.
    pub fn top_level(&self) -> &[FolderNode] {
        &self.nodes
    }

    /// Returns the channel this tree is bound to.
    pub fn channel(&self) -> &RefreshChannel {
        &self.channel
    }

    /// Finds a node by folder id anywhere in the materialized tree.
    pub fn find_node_mut(&mut self, folder_id: FolderId) -> Option<&mut FolderNode> {
        self.nodes
            .iter_mut()
            .find_map(|node| node.find_node_mut(folder_id))
    }

    /// Drains every pending refresh signal in the tree.
    ///
    /// A pending root signal re-fetches the top-level list and merges it
    /// (preserving surviving node instances); each node then drains its own
    /// mailbox recursively. Idempotent for duplicate signal values.
    pub fn process_signals<R: FolderRepository>(
        &mut self,
        repo: &R,
    ) -> Result<(), FolderRepoError> {
        if self.subscription.take().is_some() {
            let fetched = repo.fetch_top_folders()?;
            merge_child_nodes(&mut self.nodes, fetched, &self.channel);
        }
        for node in &mut self.nodes {
            node.process_signals(repo)?;
        }
        Ok(())
    }

    /// Creates a folder under an optional parent and publishes the refresh
    /// signal for the affected container.
    pub fn create_folder<R: FolderRepository>(
        &self,
        repo: &R,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Result<Folder, FolderCommandError> {
        create_folder(repo, &self.channel, name, parent_id)
    }
}
