//! Shared refresh-location broadcast cell.
//!
//! # Responsibility
//! - Hold the latest "which container needs its children reloaded" value.
//! - Fan it out to every subscriber whose target location matches.
//!
//! # Invariants
//! - Single-slot semantics: a subscriber that has not consumed a pending
//!   value observes only the latest publish, never intermediate ones.
//! - A new subscriber immediately observes the current value when it matches
//!   its target (replay-latest).
//! - Dropping a `Subscription` releases its slot; the channel prunes dead
//!   slots on the next publish.
//! - The cell does not survive process restart.

use crate::model::folder::FolderId;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Identifies which container's children are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderLocation {
    /// The top-level folder list.
    Root,
    /// The children of one specific folder.
    Folder(FolderId),
}

impl FolderLocation {
    /// Maps an optional parent id to its refresh target.
    pub fn for_parent(parent_id: Option<FolderId>) -> Self {
        match parent_id {
            None => Self::Root,
            Some(id) => Self::Folder(id),
        }
    }
}

type Mailbox = Mutex<Option<FolderLocation>>;

struct SubscriberSlot {
    target: FolderLocation,
    mailbox: Weak<Mailbox>,
}

#[derive(Default)]
struct ChannelState {
    current: Option<FolderLocation>,
    slots: Vec<SubscriberSlot>,
}

/// Process-wide single-value broadcast cell for refresh locations.
///
/// Handles are cheap clones of one shared cell; every tree controller, node
/// and row controller in the process holds a clone of the same channel.
#[derive(Clone, Default)]
pub struct RefreshChannel {
    inner: Arc<Mutex<ChannelState>>,
}

impl RefreshChannel {
    /// Creates an empty channel with no current value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the current value and delivers it to matching subscribers.
    ///
    /// Delivery overwrites each matching subscriber's pending slot: only the
    /// latest value wins when publishes outpace consumption.
    pub fn publish(&self, location: FolderLocation) {
        let mut state = lock(&self.inner);
        state.current = Some(location);
        state.slots.retain(|slot| match slot.mailbox.upgrade() {
            Some(mailbox) => {
                if slot.target == location {
                    *lock(&mailbox) = Some(location);
                }
                true
            }
            None => false,
        });
        debug!("event=refresh_publish module=state location={location:?}");
    }

    /// Registers a subscription filtered to one exact location.
    ///
    /// The current value is replayed into the mailbox when it matches.
    pub fn subscribe(&self, target: FolderLocation) -> Subscription {
        let mut state = lock(&self.inner);
        let initial = state.current.filter(|location| *location == target);
        let mailbox = Arc::new(Mutex::new(initial));
        state.slots.push(SubscriberSlot {
            target,
            mailbox: Arc::downgrade(&mailbox),
        });
        Subscription { mailbox }
    }

    /// Returns the most recently published location, if any.
    pub fn latest(&self) -> Option<FolderLocation> {
        lock(&self.inner).current
    }
}

/// One subscriber's view of the channel: a single-slot mailbox.
pub struct Subscription {
    mailbox: Arc<Mailbox>,
}

impl Subscription {
    /// Consumes the pending location, if any. Each delivery is observed once.
    pub fn take(&self) -> Option<FolderLocation> {
        lock(&self.mailbox).take()
    }

    /// Seeds the mailbox when nothing is pending.
    ///
    /// Used by the root controller to schedule its initial load without
    /// clobbering a value that was already replayed at subscribe time.
    pub fn prepend(self, location: FolderLocation) -> Self {
        {
            let mut pending = lock(&self.mailbox);
            if pending.is_none() {
                *pending = Some(location);
            }
        }
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned cell still holds a consistent Option value; keep going.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
