//! llamachat - terminal chat with persistent sessions
//!
//! This library provides the pieces behind the `llamachat` binary: a SQLite
//! session store, the in-memory session collection, a streaming client for
//! OpenAI-compatible chat-completion endpoints and the orchestration that
//! ties them together.
//!
//! # Architecture
//!
//! - `storage`: SQLite persistence of sessions
//! - `session`: session collection, selection and naming rules
//! - `providers`: streaming completion abstraction and OpenAI-compatible client
//! - `chat`: prompt submission and reply streaming for the selected session
//! - `commands`: interactive loop and session management commands
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use llamachat::{ChatOrchestrator, Config, SessionManager};
//! use llamachat::providers::{create_provider, Provider};
//! use llamachat::storage::SqliteStorage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let manager = SessionManager::load(SqliteStorage::new_with_path("chat.db")?)?;
//!     let provider: Arc<dyn Provider> = Arc::from(create_provider(&config.provider)?);
//!     let mut chat = ChatOrchestrator::new(manager, provider, config.provider.temperature)?;
//!
//!     chat.sessions_mut().create()?;
//!     let exchange = chat.submit("Hello world", |token| print!("{}", token)).await?;
//!     println!("\n{:?}", exchange.renamed_to);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatOrchestrator, ChatState, Exchange};
pub use config::Config;
pub use error::{ChatError, Result};
pub use session::SessionManager;

#[cfg(test)]
pub mod test_utils;
