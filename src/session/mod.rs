//! In-memory session collection backed by the session store
//!
//! `SessionManager` owns every loaded [`Session`] plus the id of the
//! selected one. Mutations hit the database first; the in-memory state only
//! changes once the store accepted the write.

pub mod naming;

use crate::error::{ChatError, Result};
use crate::providers::Message;
use crate::storage::{Session, SqliteStorage};

/// Default number of prompt characters used to title a new session
pub const DEFAULT_TITLE_LENGTH: usize = 7;

/// Session collection plus the currently selected session
pub struct SessionManager {
    storage: SqliteStorage,
    sessions: Vec<Session>,
    current: Option<String>,
    title_length: usize,
}

impl SessionManager {
    /// Load every stored session; nothing is selected afterwards
    ///
    /// # Errors
    ///
    /// Propagates storage failures and corrupted message logs
    pub fn load(storage: SqliteStorage) -> Result<Self> {
        let sessions = storage.load_all()?;
        tracing::info!("Loaded {} chat sessions", sessions.len());
        Ok(Self {
            storage,
            sessions,
            current: None,
            title_length: DEFAULT_TITLE_LENGTH,
        })
    }

    /// Load every readable session, returning corrupt rows as errors
    ///
    /// Used by the interactive loop so one damaged row does not lock the
    /// user out of the rest of the collection.
    ///
    /// # Errors
    ///
    /// Propagates storage failures
    pub fn load_skipping_corrupt(storage: SqliteStorage) -> Result<(Self, Vec<ChatError>)> {
        let (sessions, skipped) = storage.load_all_skipping_corrupt()?;
        tracing::info!(
            "Loaded {} chat sessions ({} unreadable)",
            sessions.len(),
            skipped.len()
        );
        let manager = Self {
            storage,
            sessions,
            current: None,
            title_length: DEFAULT_TITLE_LENGTH,
        };
        Ok((manager, skipped))
    }

    /// Set how many prompt characters become the title of a fresh session
    pub fn with_title_length(mut self, title_length: usize) -> Self {
        self.title_length = title_length.max(1);
        self
    }

    /// Number of prompt characters used for automatic titles
    pub fn title_length(&self) -> usize {
        self.title_length
    }

    /// All sessions in display order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of loaded sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is loaded
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether the collection is big enough to suggest archiving
    pub fn is_large(&self, threshold: usize) -> bool {
        self.sessions.len() > threshold
    }

    /// Id of the selected session
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The selected session
    pub fn current(&self) -> Option<&Session> {
        let id = self.current.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Look up a session by exact id
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()).into())
    }

    /// Resolve a user-supplied reference to a session id
    ///
    /// Accepts a full id, a 1-based list position, or an id prefix that
    /// matches exactly one session.
    pub fn resolve(&self, key: &str) -> Result<String> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ChatError::SessionNotFound(String::new()).into());
        }

        if let Some(session) = self.get(key) {
            return Ok(session.id.clone());
        }

        if let Ok(position) = key.parse::<usize>() {
            if let Some(session) = position.checked_sub(1).and_then(|i| self.sessions.get(i)) {
                return Ok(session.id.clone());
            }
        }

        let mut matches = self.sessions.iter().filter(|s| s.id.starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(session), None) => Ok(session.id.clone()),
            (Some(_), Some(_)) => Err(ChatError::SessionNotFound(format!(
                "{} (ambiguous id prefix)",
                key
            ))
            .into()),
            _ => Err(ChatError::SessionNotFound(key.to_string()).into()),
        }
    }

    /// `candidate` made unique against every session except `exclude`
    pub fn unique_name(&self, candidate: &str, exclude: Option<&str>) -> String {
        naming::unique_name(
            candidate,
            self.sessions
                .iter()
                .filter(|s| Some(s.id.as_str()) != exclude)
                .map(|s| s.name.as_str()),
        )
    }

    /// Create an empty session, persist it and select it
    pub fn create(&mut self) -> Result<&Session> {
        let name = naming::default_name(
            self.sessions.len(),
            self.sessions.iter().map(|s| s.name.as_str()),
        );
        let session = Session::new(name);
        self.storage.insert_session(&session)?;

        tracing::info!(id = %session.id, name = %session.name, "Created session");
        self.current = Some(session.id.clone());
        self.sessions.push(session);
        Ok(&self.sessions[self.sessions.len() - 1])
    }

    /// Select a session
    pub fn select(&mut self, key: &str) -> Result<&Session> {
        let id = self.resolve(key)?;
        tracing::debug!(id = %id, "Selected session");
        self.current = Some(id);
        self.current().ok_or_else(|| ChatError::NoActiveSession.into())
    }

    /// Delete a session from the store and from memory
    ///
    /// Clears the selection when the deleted session was selected.
    pub fn delete(&mut self, key: &str) -> Result<Session> {
        let id = self.resolve(key)?;
        self.storage.delete_session(&id)?;

        if self.current.as_deref() == Some(id.as_str()) {
            self.current = None;
        }
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;

        let removed = self.sessions.remove(index);
        tracing::info!(id = %removed.id, name = %removed.name, "Deleted session");
        Ok(removed)
    }

    /// Rename a session, suffixing `" (n)"` if the name is taken
    ///
    /// Returns the name actually applied.
    pub fn rename(&mut self, key: &str, new_name: &str) -> Result<String> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(ChatError::InvalidName("name cannot be empty".to_string()).into());
        }

        let id = self.resolve(key)?;
        let name = self.unique_name(trimmed, Some(id.as_str()));
        self.storage.rename_session(&id, &name)?;
        self.get_mut(&id)?.name = name.clone();

        tracing::info!(id = %id, name = %name, "Renamed session");
        Ok(name)
    }

    /// Append a message to a session (in memory only)
    pub fn push_message(&mut self, id: &str, message: Message) -> Result<usize> {
        let session = self.get_mut(id)?;
        session.messages.push(message);
        Ok(session.messages.len())
    }

    /// Remove the last message of a session (in memory only)
    pub fn pop_message(&mut self, id: &str) -> Result<Option<Message>> {
        Ok(self.get_mut(id)?.messages.pop())
    }

    /// Persist name and messages of every session
    pub fn save_all(&self) -> Result<()> {
        self.storage.save_all(&self.sessions)
    }

    /// Replace the in-memory collection with the stored one
    ///
    /// The selection survives if the selected session still exists.
    pub fn reload(&mut self) -> Result<()> {
        self.sessions = self.storage.load_all()?;
        if let Some(id) = self.current.as_deref() {
            if self.get(id).is_none() {
                self.current = None;
            }
        }
        Ok(())
    }

    /// The backing store
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}
