//! Folder repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for the folder hierarchy.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Child listing is deterministic: `created_at ASC, rowid ASC` (creation
//!   order, insertion order as tie-break).
//! - `add_folder` persists immediately; the caller never sees an unsaved row.
//! - Renaming or deleting a detached folder is a silent no-op.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::folder::{Folder, FolderId};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const FOLDER_SELECT_SQL: &str = "SELECT
    folder_uuid,
    name,
    parent_uuid,
    created_at
FROM folders";

/// Result type used by folder repository operations.
pub type FolderRepoResult<T> = Result<T, FolderRepoError>;

/// Errors from folder repository operations.
#[derive(Debug)]
pub enum FolderRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Parent folder does not exist.
    ParentNotFound(FolderId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for FolderRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ParentNotFound(id) => write!(f, "parent folder not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "folder repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "folder repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "folder repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid folder data: {message}"),
        }
    }
}

impl Error for FolderRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for FolderRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for FolderRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for folder hierarchy operations.
pub trait FolderRepository {
    /// Lists root-level folders in creation order.
    fn fetch_top_folders(&self) -> FolderRepoResult<Vec<Folder>>;
    /// Lists direct children of one folder in creation order.
    fn fetch_children(&self, parent_id: FolderId) -> FolderRepoResult<Vec<Folder>>;
    /// Loads one folder by id.
    fn get_folder(&self, folder_id: FolderId) -> FolderRepoResult<Option<Folder>>;
    /// Creates one folder under an optional parent and persists it.
    fn add_folder(&self, name: &str, parent_id: Option<FolderId>) -> FolderRepoResult<Folder>;
    /// Renames one folder. Detached folders are returned unchanged.
    fn update_folder(&self, folder: &Folder, new_name: &str) -> FolderRepoResult<Folder>;
    /// Deletes one folder; descendants and contained notes cascade.
    fn delete_folder(&self, folder_id: FolderId) -> FolderRepoResult<()>;
}

/// SQLite-backed folder repository.
pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> FolderRepoResult<Self> {
        ensure_folder_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn fetch_top_folders(&self) -> FolderRepoResult<Vec<Folder>> {
        let sql = format!(
            "{FOLDER_SELECT_SQL}
             WHERE parent_uuid IS NULL
             ORDER BY created_at ASC, rowid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        collect_folders(&mut rows)
    }

    fn fetch_children(&self, parent_id: FolderId) -> FolderRepoResult<Vec<Folder>> {
        let sql = format!(
            "{FOLDER_SELECT_SQL}
             WHERE parent_uuid = ?1
             ORDER BY created_at ASC, rowid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([parent_id.to_string()])?;
        collect_folders(&mut rows)
    }

    fn get_folder(&self, folder_id: FolderId) -> FolderRepoResult<Option<Folder>> {
        let sql = format!(
            "{FOLDER_SELECT_SQL}
             WHERE folder_uuid = ?1;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([folder_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_folder_row(row)?));
        }
        Ok(None)
    }

    fn add_folder(&self, name: &str, parent_id: Option<FolderId>) -> FolderRepoResult<Folder> {
        if let Some(parent_id) = parent_id {
            if self.get_folder(parent_id)?.is_none() {
                return Err(FolderRepoError::ParentNotFound(parent_id));
            }
        }

        let folder_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO folders (folder_uuid, name, parent_uuid)
             VALUES (?1, ?2, ?3);",
            params![
                folder_id.to_string(),
                name,
                parent_id.map(|value| value.to_string()),
            ],
        )?;
        debug!(
            "event=folder_insert module=repo status=ok folder_id={folder_id} parent_id={:?}",
            parent_id
        );

        self.get_folder(folder_id)?.ok_or_else(|| {
            FolderRepoError::InvalidData(format!("inserted folder {folder_id} not readable back"))
        })
    }

    fn update_folder(&self, folder: &Folder, new_name: &str) -> FolderRepoResult<Folder> {
        let changed = self.conn.execute(
            "UPDATE folders
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE folder_uuid = ?1;",
            params![folder.id.to_string(), new_name],
        )?;

        // Detached row: return the caller's snapshot untouched.
        if changed == 0 {
            debug!(
                "event=folder_rename module=repo status=noop folder_id={}",
                folder.id
            );
            return Ok(folder.clone());
        }

        let mut updated = folder.clone();
        updated.name = new_name.to_string();
        Ok(updated)
    }

    fn delete_folder(&self, folder_id: FolderId) -> FolderRepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM folders WHERE folder_uuid = ?1;",
            [folder_id.to_string()],
        )?;
        debug!(
            "event=folder_delete module=repo status={} folder_id={folder_id}",
            if changed == 0 { "noop" } else { "ok" }
        );
        Ok(())
    }
}

fn collect_folders(rows: &mut rusqlite::Rows<'_>) -> FolderRepoResult<Vec<Folder>> {
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_folder_row(row)?);
    }
    Ok(items)
}

fn parse_folder_row(row: &Row<'_>) -> FolderRepoResult<Folder> {
    let folder_uuid_text: String = row.get("folder_uuid")?;
    let id = parse_uuid(&folder_uuid_text, "folders.folder_uuid")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "folders.parent_uuid"))
        .transpose()?;

    Ok(Folder {
        id,
        name: row.get("name")?,
        parent_id,
        created_at: row.get("created_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> FolderRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| FolderRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_folder_connection_ready(conn: &Connection) -> FolderRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(FolderRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "folders")? {
        return Err(FolderRepoError::MissingRequiredTable("folders"));
    }

    for column in ["folder_uuid", "name", "parent_uuid", "created_at"] {
        if !table_has_column(conn, "folders", column)? {
            return Err(FolderRepoError::MissingRequiredColumn {
                table: "folders",
                column,
            });
        }
    }

    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn table_has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
