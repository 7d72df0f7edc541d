//! Base provider trait and common types for llamachat
//!
//! This module defines the conversation message type shared by the
//! session store and the completion providers, and the streaming
//! `Provider` trait.

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person at the terminal
    User,
    /// Text produced by the model
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message structure for conversation
///
/// Serialises to `{"role": "...", "content": "..."}`, the shape used both in
/// the `messages` column of the session table and in completion requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use llamachat::providers::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Stream of content deltas from a streaming completion
pub type TokenStream = BoxStream<'static, Result<String>>;

/// Provider trait for streaming chat completions
///
/// # Examples
///
/// ```
/// use llamachat::providers::{Message, Provider, TokenStream};
/// use llamachat::error::Result;
/// use async_trait::async_trait;
/// use futures::StreamExt;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Provider for Echo {
///     async fn stream_chat(&self, messages: &[Message], _temperature: f32) -> Result<TokenStream> {
///         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(futures::stream::iter(vec![Ok(last)]).boxed())
///     }
///
///     fn model(&self) -> &str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Starts a streaming completion over the full conversation history
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation history, oldest first
    /// * `temperature` - Sampling temperature (0.0 to 2.0)
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the endpoint rejects it.
    /// Failures while reading the body surface as `Err` items of the stream.
    async fn stream_chat(&self, messages: &[Message], temperature: f32) -> Result<TokenStream>;

    /// Name of the model requests are sent to
    fn model(&self) -> &str;
}
