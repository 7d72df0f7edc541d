use crate::error::{ChatError, Result};
use crate::providers::Message;
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::Session;

/// File name of the session database inside the data directory
pub const DB_FILE_NAME: &str = "chat_sessions.db";

/// Storage backend for chat sessions
///
/// Holds only the database path; each operation opens its own connection
/// and releases it before returning.
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Uses `LLAMACHAT_DB` when set, otherwise `chat_sessions.db` in the
    /// user's data directory.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("LLAMACHAT_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("org", "llamachat", "llamachat")
            .ok_or_else(|| ChatError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join(DB_FILE_NAME))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use llamachat::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("chat.db")).unwrap();
    /// assert!(storage.load_all().unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatError::Storage(e.to_string()).into())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                name TEXT,
                messages TEXT
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ChatError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Insert a new session row
    pub fn insert_session(&self, session: &Session) -> Result<()> {
        let conn = self.connect()?;
        let messages_json = encode_messages(&session.messages)?;

        conn.execute(
            "INSERT INTO sessions (id, name, messages) VALUES (?, ?, ?)",
            params![session.id, session.name, messages_json],
        )
        .context("Failed to insert session")
        .map_err(|e| ChatError::Storage(e.to_string()))?;

        tracing::debug!(id = %session.id, name = %session.name, "Inserted session");
        Ok(())
    }

    /// Delete a session row; deleting a missing id is not an error
    pub fn delete_session(&self, id: &str) -> Result<()> {
        let conn = self.connect()?;

        let removed = conn
            .execute("DELETE FROM sessions WHERE id = ?", params![id])
            .context("Failed to delete session")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        tracing::debug!(id = %id, removed, "Deleted session");
        Ok(())
    }

    /// Update only the name of a session
    pub fn rename_session(&self, id: &str, name: &str) -> Result<()> {
        let conn = self.connect()?;

        let updated = conn
            .execute(
                "UPDATE sessions SET name = ? WHERE id = ?",
                params![name, id],
            )
            .context("Failed to update session name")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        if updated == 0 {
            return Err(ChatError::SessionNotFound(id.to_string()).into());
        }
        Ok(())
    }

    /// Overwrite name and messages of every given session in one transaction
    pub fn save_all(&self, sessions: &[Session]) -> Result<()> {
        let mut conn = self.connect()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        for session in sessions {
            let messages_json = encode_messages(&session.messages)?;
            let updated = tx
                .execute(
                    "UPDATE sessions SET name = ?, messages = ? WHERE id = ?",
                    params![session.name, messages_json, session.id],
                )
                .context("Failed to update session")
                .map_err(|e| ChatError::Storage(e.to_string()))?;

            if updated == 0 {
                tracing::warn!(id = %session.id, "Session has no stored row; skipped on save");
            }
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        tracing::debug!("Saved {} sessions", sessions.len());
        Ok(())
    }

    /// Load every session in insertion order
    ///
    /// # Errors
    ///
    /// Returns `ChatError::CorruptMessages` if any row holds a message log
    /// that is not a valid JSON array of messages.
    pub fn load_all(&self) -> Result<Vec<Session>> {
        let sessions = self
            .read_rows()?
            .into_iter()
            .map(decode_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} sessions from {}", sessions.len(), self.db_path.display());
        Ok(sessions)
    }

    /// Load every readable session, setting aside rows with a corrupt log
    ///
    /// Corrupt rows stay untouched in the database and are returned as
    /// `ChatError::CorruptMessages` next to the sessions that did load.
    ///
    /// # Errors
    ///
    /// Returns error if the table itself cannot be read
    pub fn load_all_skipping_corrupt(&self) -> Result<(Vec<Session>, Vec<ChatError>)> {
        let mut sessions = Vec::new();
        let mut skipped = Vec::new();

        for row in self.read_rows()? {
            match decode_row(row) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!("Skipping unreadable session: {}", e);
                    skipped.push(e);
                }
            }
        }

        tracing::debug!(
            loaded = sessions.len(),
            skipped = skipped.len(),
            "Loaded sessions from {}",
            self.db_path.display()
        );
        Ok((sessions, skipped))
    }

    fn read_rows(&self) -> Result<Vec<RawRow>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare("SELECT id, name, messages FROM sessions ORDER BY rowid")
            .context("Failed to prepare statement")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    messages_json: row.get(2)?,
                })
            })
            .context("Failed to query sessions")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        let rows = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read session row")
            .map_err(|e| ChatError::Storage(e.to_string()))?;
        Ok(rows)
    }
}

/// One `sessions` row before its message log is decoded
struct RawRow {
    id: String,
    name: Option<String>,
    messages_json: Option<String>,
}

fn decode_row(row: RawRow) -> std::result::Result<Session, ChatError> {
    let messages: Vec<Message> = serde_json::from_str(row.messages_json.as_deref().unwrap_or("[]"))
        .map_err(|e| ChatError::CorruptMessages {
            id: row.id.clone(),
            reason: e.to_string(),
        })?;

    Ok(Session {
        id: row.id,
        name: row.name.unwrap_or_default(),
        messages,
    })
}

fn encode_messages(messages: &[Message]) -> Result<String> {
    serde_json::to_string(messages)
        .context("Failed to serialize messages")
        .map_err(|e| ChatError::Storage(e.to_string()).into())
}
