//! Per-folder action surface: rename, delete, create-subfolder.
//!
//! # Responsibility
//! - Validate and execute folder mutations against the repository.
//! - Publish the refresh signal that makes the mutation visible in the tree.
//!
//! # Invariants
//! - Mutations never insert into in-memory lists; the affected container
//!   learns about them only through its refresh-triggered re-fetch.
//! - Delete is two-step: nothing is removed before an explicit confirm.
//! - The parent id is captured before the delete; reading it afterwards
//!   would touch a detached row.
//! - Empty names are rejected before storage is touched.

use crate::model::folder::{Folder, FolderId};
use crate::repo::folder_repo::{FolderRepoError, FolderRepository};
use crate::state::refresh::{FolderLocation, RefreshChannel};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from folder mutation commands.
#[derive(Debug)]
pub enum FolderCommandError {
    /// Name is blank after trim; storage was not touched.
    EmptyName,
    /// Repository-level failure; existing state is left untouched.
    Repo(FolderRepoError),
}

impl Display for FolderCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "folder name must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FolderCommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EmptyName => None,
        }
    }
}

impl From<FolderRepoError> for FolderCommandError {
    fn from(value: FolderRepoError) -> Self {
        Self::Repo(value)
    }
}

/// Action controller for one folder row.
pub struct FolderRow {
    folder: Folder,
    delete_pending: bool,
    channel: RefreshChannel,
}

impl FolderRow {
    /// Creates a row controller for one folder.
    pub fn new(folder: Folder, channel: RefreshChannel) -> Self {
        Self {
            folder,
            delete_pending: false,
            channel,
        }
    }

    /// Returns the folder snapshot this row acts on.
    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    /// Renames the folder.
    ///
    /// Blank names fail with [`FolderCommandError::EmptyName`] without
    /// touching storage. A detached folder is a silent no-op at the
    /// repository level; the local snapshot is refreshed from the returned
    /// row either way.
    pub fn rename<R: FolderRepository>(
        &mut self,
        repo: &R,
        new_name: &str,
    ) -> Result<(), FolderCommandError> {
        let normalized = normalize_folder_name(new_name)?;
        self.folder = repo.update_folder(&self.folder, &normalized)?;
        info!(
            "event=folder_rename module=state status=ok folder_id={}",
            self.folder.id
        );
        Ok(())
    }

    /// First step of the delete flow: asks for confirmation.
    pub fn request_delete(&mut self) {
        self.delete_pending = true;
    }

    /// Abandons a pending delete without touching storage.
    pub fn cancel_delete(&mut self) {
        self.delete_pending = false;
    }

    /// Returns whether a delete is awaiting confirmation.
    pub fn is_delete_pending(&self) -> bool {
        self.delete_pending
    }

    /// Second step of the delete flow: deletes and notifies the parent.
    ///
    /// No-op unless a delete was requested. On success publishes exactly one
    /// refresh signal targeted at the deleted folder's parent container —
    /// never at the folder itself; that downstream refresh is the only way
    /// the deletion becomes observable in the tree.
    pub fn confirm_delete<R: FolderRepository>(
        &mut self,
        repo: &R,
    ) -> Result<(), FolderCommandError> {
        if !self.delete_pending {
            return Ok(());
        }

        // Capture before the row disappears from storage.
        let parent_id = self.folder.parent_id;
        repo.delete_folder(self.folder.id)?;
        self.delete_pending = false;

        let location = FolderLocation::for_parent(parent_id);
        self.channel.publish(location);
        info!(
            "event=folder_delete module=state status=ok folder_id={} refresh_target={location:?}",
            self.folder.id
        );
        Ok(())
    }

    /// Creates a subfolder under this row's folder.
    ///
    /// Publishes exactly one refresh signal targeted at this folder, whose
    /// node — once expanded — picks up the new entry on its next re-fetch.
    pub fn create_subfolder<R: FolderRepository>(
        &self,
        repo: &R,
        name: &str,
    ) -> Result<Folder, FolderCommandError> {
        create_folder(repo, &self.channel, name, Some(self.folder.id))
    }
}

/// Creates a folder under an optional parent and publishes the refresh
/// signal for the affected container.
///
/// The created folder is returned to the caller but never inserted into any
/// in-memory list; storage stays the single source of truth.
pub fn create_folder<R: FolderRepository>(
    repo: &R,
    channel: &RefreshChannel,
    name: &str,
    parent_id: Option<FolderId>,
) -> Result<Folder, FolderCommandError> {
    let normalized = normalize_folder_name(name)?;
    let created = repo.add_folder(&normalized, parent_id)?;

    let location = FolderLocation::for_parent(parent_id);
    channel.publish(location);
    info!(
        "event=folder_create module=state status=ok folder_id={} refresh_target={location:?}",
        created.id
    );
    Ok(created)
}

fn normalize_folder_name(value: &str) -> Result<String, FolderCommandError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FolderCommandError::EmptyName);
    }
    Ok(trimmed.to_string())
}
