//! Error types for llamachat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for llamachat operations
///
/// Covers configuration loading, session storage, session bookkeeping and
/// provider interactions. None of these are fatal to the interactive loop:
/// callers report them and abandon the action that triggered them.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored message log could not be decoded
    #[error("Corrupted messages for session {id}: {reason}")]
    CorruptMessages {
        /// Identifier of the offending row
        id: String,
        /// Decoder message
        reason: String,
    },

    /// No session matches the given identifier
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// An operation needs a selected session but none is active
    #[error("No active session. Create or select a chat session to start")]
    NoActiveSession,

    /// Session names must contain at least one visible character
    #[error("Invalid session name: {0}")]
    InvalidName(String),

    /// Temperature outside the accepted range
    #[error("Temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    /// Prompts must not be blank
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    /// Provider-related errors (API calls, HTTP status, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Malformed data while reading a streaming response
    #[error("Stream error: {0}")]
    Stream(String),

    /// Neither a base URL nor a host address was configured
    #[error("No inference endpoint configured; set LLAMACPP_IP or provider.base_url")]
    MissingHost,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for llamachat operations
///
/// Uses `anyhow::Error` so call sites can attach context while still
/// allowing callers to downcast to [`ChatError`].
pub type Result<T> = anyhow::Result<T>;
