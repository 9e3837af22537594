//! Per-folder tree node state machine.
//!
//! # Responsibility
//! - Own one folder's expand/collapse flag and materialized child nodes.
//! - Re-fetch children when a refresh signal targets this folder.
//!
//! # Invariants
//! - Children are loaded lazily: a collapsed node holds no child state.
//! - A refresh while collapsed is a no-op; the next toggle fetches fresh data.
//! - Merging preserves surviving node instances, so a still-present child
//!   keeps its own expand state and loaded subtree.
//! - A fetch result is applied only when its ticket is still current
//!   (last-initiated load wins; collapse invalidates in-flight loads).

use crate::model::folder::{Folder, FolderId};
use crate::repo::folder_repo::{FolderRepoError, FolderRepository};
use crate::state::refresh::{FolderLocation, RefreshChannel, Subscription};
use log::debug;

/// Claim ticket for one child-list fetch.
///
/// Obtained from [`FolderNode::begin_fetch`]; redeemed by
/// [`FolderNode::apply_fetch`]. A ticket superseded by a newer load or by a
/// collapse is silently discarded at apply time.
#[derive(Debug, Clone, Copy)]
pub struct FetchTicket {
    generation: u64,
}

/// One visible folder's view-model state.
///
/// Nodes form a recursive tree: each node exclusively owns its direct
/// children's state, and no node is shared across two parents.
pub struct FolderNode {
    folder: Folder,
    expanded: bool,
    children: Vec<FolderNode>,
    channel: RefreshChannel,
    subscription: Subscription,
    load_generation: u64,
}

impl FolderNode {
    /// Materializes a node for one folder and subscribes it to refresh
    /// signals targeted at its own id.
    pub fn new(folder: Folder, channel: &RefreshChannel) -> Self {
        let subscription = channel.subscribe(FolderLocation::Folder(folder.id));
        Self {
            folder,
            expanded: false,
            children: Vec::new(),
            channel: channel.clone(),
            subscription,
            load_generation: 0,
        }
    }

    /// Returns the folder snapshot backing this node.
    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    /// Returns this node's stable identity.
    pub fn id(&self) -> FolderId {
        self.folder.id
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Returns the materialized child nodes (empty while collapsed).
    pub fn children(&self) -> &[FolderNode] {
        &self.children
    }

    /// Flips the expand/collapse state.
    ///
    /// Expanding fetches children synchronously; a failed fetch leaves the
    /// node collapsed with no partial state. Collapsing discards the
    /// in-memory child list without touching storage and invalidates any
    /// fetch still in flight, so a late result cannot reopen the node.
    pub fn toggle<R: FolderRepository>(&mut self, repo: &R) -> Result<(), FolderRepoError> {
        if self.expanded {
            self.expanded = false;
            self.children.clear();
            self.load_generation += 1;
            return Ok(());
        }

        let ticket = self.begin_fetch();
        let fetched = repo.fetch_children(self.folder.id)?;
        self.expanded = true;
        self.apply_fetch(ticket, fetched);
        Ok(())
    }

    /// Starts a child-list load, superseding any earlier in-flight load.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.load_generation += 1;
        FetchTicket {
            generation: self.load_generation,
        }
    }

    /// Applies a completed child-list fetch.
    ///
    /// Stale tickets and results arriving on a collapsed node are dropped;
    /// the node keeps its last-known-good children.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, fetched: Vec<Folder>) {
        if ticket.generation != self.load_generation || !self.expanded {
            debug!(
                "event=fetch_discarded module=state folder_id={} ticket_gen={} current_gen={} expanded={}",
                self.folder.id, ticket.generation, self.load_generation, self.expanded
            );
            return;
        }
        merge_child_nodes(&mut self.children, fetched, &self.channel);
    }

    /// Drains this node's refresh mailbox, then its children's, recursively.
    ///
    /// An expanded node re-fetches and merges; a collapsed node ignores the
    /// signal. Duplicate delivery of the same location converges on the same
    /// child list.
    pub fn process_signals<R: FolderRepository>(
        &mut self,
        repo: &R,
    ) -> Result<(), FolderRepoError> {
        if self.subscription.take().is_some() && self.expanded {
            let ticket = self.begin_fetch();
            let fetched = repo.fetch_children(self.folder.id)?;
            self.apply_fetch(ticket, fetched);
        }
        for child in &mut self.children {
            child.process_signals(repo)?;
        }
        Ok(())
    }

    /// Finds a node by folder id in this subtree.
    pub fn find_node_mut(&mut self, folder_id: FolderId) -> Option<&mut FolderNode> {
        if self.folder.id == folder_id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_node_mut(folder_id))
    }

    pub(crate) fn refresh_snapshot(&mut self, folder: Folder) {
        self.folder = folder;
    }
}

/// Merges a fresh fetch result into an existing node list.
///
/// Diff by id: nodes absent from the result are removed, newly present
/// folders are appended as collapsed nodes, surviving nodes keep their
/// instance (expand state included) and only refresh their folder snapshot.
/// Used identically by per-folder nodes and the root controller.
pub(crate) fn merge_child_nodes(
    nodes: &mut Vec<FolderNode>,
    fetched: Vec<Folder>,
    channel: &RefreshChannel,
) {
    nodes.retain(|node| fetched.iter().any(|folder| folder.id == node.folder.id));
    for folder in fetched {
        match nodes.iter_mut().find(|node| node.folder.id == folder.id) {
            Some(existing) => existing.refresh_snapshot(folder),
            None => nodes.push(FolderNode::new(folder, channel)),
        }
    }
}
