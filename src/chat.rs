//! Chat orchestration
//!
//! Ties the session collection to a completion provider: a submitted prompt
//! is appended to the selected session, the full history is streamed to the
//! model and the finished reply is appended and persisted.

use crate::config::validate_temperature;
use crate::error::{ChatError, Result};
use crate::providers::{Message, Provider};
use crate::session::{naming, SessionManager};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;

/// Whether a session is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    /// Nothing selected; prompts are refused
    NoActiveSession,
    /// Prompts go to the session with this id
    ActiveSession(String),
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveSession => write!(f, "no active session"),
            Self::ActiveSession(id) => write!(f, "active session {}", id),
        }
    }
}

/// Result of a completed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Full assistant reply
    pub reply: String,
    /// New session name when the prompt was the session's first message
    pub renamed_to: Option<String>,
    /// Why the automatic rename on the first message failed, if it did
    pub rename_error: Option<String>,
}

/// Drives a conversation for the selected session
pub struct ChatOrchestrator {
    sessions: SessionManager,
    provider: Arc<dyn Provider>,
    temperature: f32,
}

impl ChatOrchestrator {
    /// Create an orchestrator
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvalidTemperature` if `temperature` is outside
    /// 0.0 to 2.0
    pub fn new(
        sessions: SessionManager,
        provider: Arc<dyn Provider>,
        temperature: f32,
    ) -> Result<Self> {
        validate_temperature(temperature)?;
        Ok(Self {
            sessions,
            provider,
            temperature,
        })
    }

    /// Current state of the conversation
    pub fn state(&self) -> ChatState {
        match self.sessions.current_id() {
            Some(id) => ChatState::ActiveSession(id.to_string()),
            None => ChatState::NoActiveSession,
        }
    }

    /// The session collection
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Mutable access for create/select/rename/delete
    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    /// Sampling temperature used for new requests
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Change the sampling temperature
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        tracing::debug!(temperature, "Temperature changed");
        Ok(())
    }

    /// Model the provider talks to
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Send a prompt to the selected session and stream the reply
    ///
    /// Every content delta is handed to `on_token` as it arrives. When the
    /// prompt is the session's first message the session is renamed after
    /// it. If the stream fails the partial reply is dropped and the
    /// unanswered prompt is removed again.
    ///
    /// # Errors
    ///
    /// `EmptyPrompt`, `NoActiveSession`, provider and stream errors, and
    /// storage errors from the final save
    pub async fn submit<F>(&mut self, prompt: &str, mut on_token: F) -> Result<Exchange>
    where
        F: FnMut(&str),
    {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt.into());
        }
        let id = match self.state() {
            ChatState::ActiveSession(id) => id,
            ChatState::NoActiveSession => return Err(ChatError::NoActiveSession.into()),
        };

        let count = self.sessions.push_message(&id, Message::user(prompt))?;

        let mut rename_error = None;
        let renamed_to = if count == 1 {
            let title = naming::title_from_prompt(prompt, self.sessions.title_length());
            match self.sessions.rename(&id, &title) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!("Failed to update session name: {:#}", e);
                    rename_error = Some(format!("{:#}", e));
                    None
                }
            }
        } else {
            None
        };

        let history = self
            .sessions
            .get(&id)
            .map(|s| s.messages.clone())
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;

        let reply = match self.stream_reply(&history, &mut on_token).await {
            Ok(reply) => reply,
            Err(e) => {
                self.sessions.pop_message(&id)?;
                return Err(e);
            }
        };

        self.sessions
            .push_message(&id, Message::assistant(reply.clone()))?;
        self.sessions.save_all()?;

        Ok(Exchange {
            reply,
            renamed_to,
            rename_error,
        })
    }

    async fn stream_reply<F>(&self, history: &[Message], on_token: &mut F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut stream = self.provider.stream_chat(history, self.temperature).await?;
        let mut buffer = String::new();

        while let Some(delta) = stream.next().await {
            let delta = delta?;
            buffer.push_str(&delta);
            on_token(&delta);
        }

        tracing::debug!("Received reply of {} characters", buffer.chars().count());
        Ok(buffer)
    }
}
