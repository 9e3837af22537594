//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide note persistence APIs scoped to their owning folder.
//!
//! # Invariants
//! - Every note row references an existing folder (schema-enforced).
//! - Note listing is deterministic: `created_at ASC, rowid ASC`.
//! - `body_text` is stored lowercased; it is a search projection, not the
//!   display text.

use crate::db::DbError;
use crate::model::folder::FolderId;
use crate::model::note::{Note, NoteId, NoteStatus};
use crate::repo::folder_repo::{table_exists, table_has_column};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    note_uuid,
    folder_uuid,
    title,
    body_text,
    status,
    created_at
FROM notes";

/// Result type used by note repository operations.
pub type NoteRepoResult<T> = Result<T, NoteRepoError>;

/// Errors from note repository operations.
#[derive(Debug)]
pub enum NoteRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Owning folder does not exist.
    FolderNotFound(FolderId),
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

impl Display for NoteRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "note repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
        }
    }
}

impl Error for NoteRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for NoteRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for NoteRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note operations.
pub trait NoteRepository {
    /// Creates one note inside a folder with default `Draft` status.
    fn add_note(&self, title: &str, folder_id: FolderId) -> NoteRepoResult<Note>;
    /// Lists notes in one folder, optionally filtered by status.
    fn fetch_notes_in_folder(
        &self,
        folder_id: FolderId,
        status: Option<NoteStatus>,
    ) -> NoteRepoResult<Vec<Note>>;
    /// Replaces the plain-text body projection.
    fn update_note_body(&self, note_id: NoteId, body_text: &str) -> NoteRepoResult<()>;
    /// Moves the note to another editorial status.
    fn set_note_status(&self, note_id: NoteId, status: NoteStatus) -> NoteRepoResult<()>;
    /// Deletes one note. Missing notes are a no-op.
    fn delete_note(&self, note_id: NoteId) -> NoteRepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> NoteRepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add_note(&self, title: &str, folder_id: FolderId) -> NoteRepoResult<Note> {
        if !folder_exists(self.conn, folder_id)? {
            return Err(NoteRepoError::FolderNotFound(folder_id));
        }

        let note_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO notes (note_uuid, folder_uuid, title)
             VALUES (?1, ?2, ?3);",
            params![note_id.to_string(), folder_id.to_string(), title],
        )?;

        self.get_note(note_id)?
            .ok_or_else(|| NoteRepoError::InvalidData(format!("inserted note {note_id} not readable back")))
    }

    fn fetch_notes_in_folder(
        &self,
        folder_id: FolderId,
        status: Option<NoteStatus>,
    ) -> NoteRepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE folder_uuid = ?1");
        if status.is_some() {
            sql.push_str(" AND status = ?2");
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut items = Vec::new();
        let folder_uuid = folder_id.to_string();
        let mut rows = match status {
            Some(status) => stmt.query(params![folder_uuid, status.as_str()])?,
            None => stmt.query([folder_uuid])?,
        };
        while let Some(row) = rows.next()? {
            items.push(parse_note_row(row)?);
        }
        Ok(items)
    }

    fn update_note_body(&self, note_id: NoteId, body_text: &str) -> NoteRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET body_text = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE note_uuid = ?1;",
            params![note_id.to_string(), body_text.to_lowercase()],
        )?;
        if changed == 0 {
            return Err(NoteRepoError::NoteNotFound(note_id));
        }
        Ok(())
    }

    fn set_note_status(&self, note_id: NoteId, status: NoteStatus) -> NoteRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET status = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE note_uuid = ?1;",
            params![note_id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(NoteRepoError::NoteNotFound(note_id));
        }
        Ok(())
    }

    fn delete_note(&self, note_id: NoteId) -> NoteRepoResult<()> {
        self.conn.execute(
            "DELETE FROM notes WHERE note_uuid = ?1;",
            [note_id.to_string()],
        )?;
        Ok(())
    }
}

impl SqliteNoteRepository<'_> {
    fn get_note(&self, note_id: NoteId) -> NoteRepoResult<Option<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} WHERE note_uuid = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([note_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }
}

fn parse_note_row(row: &Row<'_>) -> NoteRepoResult<Note> {
    let note_uuid_text: String = row.get("note_uuid")?;
    let folder_uuid_text: String = row.get("folder_uuid")?;
    let status_text: String = row.get("status")?;
    let status = NoteStatus::parse(&status_text).ok_or_else(|| {
        NoteRepoError::InvalidData(format!("invalid status `{status_text}` in notes.status"))
    })?;

    Ok(Note {
        id: parse_uuid(&note_uuid_text, "notes.note_uuid")?,
        title: row.get("title")?,
        body_text: row.get("body_text")?,
        status,
        folder_id: parse_uuid(&folder_uuid_text, "notes.folder_uuid")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> NoteRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| NoteRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn folder_exists(conn: &Connection, folder_id: FolderId) -> NoteRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM folders
            WHERE folder_uuid = ?1
        );",
        [folder_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_note_connection_ready(conn: &Connection) -> NoteRepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(NoteRepoError::MissingRequiredTable("notes"));
    }

    for column in [
        "note_uuid",
        "folder_uuid",
        "title",
        "body_text",
        "status",
        "created_at",
    ] {
        if !table_has_column(conn, "notes", column)? {
            return Err(NoteRepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}
