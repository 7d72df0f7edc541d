use crate::providers::Message;

/// One persisted conversation thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique identifier (UUID v4), never changes after creation
    pub id: String,
    /// Display name, unique among loaded sessions
    pub name: String,
    /// Conversation turns, oldest first
    pub messages: Vec<Message>,
}

impl Session {
    /// Create an empty session with a fresh UUID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            messages: Vec::new(),
        }
    }

    /// First eight characters of the id, used in listings
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}
