//! Test utilities for llamachat
//!
//! Scratch session stores and a scripted provider for exercising the chat
//! flow without a network.

use crate::error::{ChatError, Result};
use crate::providers::{Message, Provider, TokenStream};
use crate::session::SessionManager;
use crate::storage::SqliteStorage;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a session manager over a fresh database in a temporary directory
///
/// Keep the returned `TempDir` alive for as long as the manager is used.
pub fn temp_manager() -> (SessionManager, TempDir) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let storage =
        SqliteStorage::new_with_path(dir.path().join("chat.db")).expect("Failed to open storage");
    let manager = SessionManager::load(storage).expect("Failed to load sessions");
    (manager, dir)
}

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these deltas, then end
    Reply(Vec<&'static str>),
    /// Stream these deltas, then fail mid-stream
    BreakAfter(Vec<&'static str>),
    /// Refuse the request outright
    Reject,
}

/// Provider returning canned deltas and recording every request
pub struct ScriptedProvider {
    scripts: Mutex<Vec<Script>>,
    /// Histories and temperatures received, in call order
    pub requests: Mutex<Vec<(Vec<Message>, f32)>>,
}

impl ScriptedProvider {
    /// Replies are consumed front to back
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn stream_chat(&self, messages: &[Message], temperature: f32) -> Result<TokenStream> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((messages.to_vec(), temperature));

        let script = {
            let mut scripts = self.scripts.lock().expect("scripts lock");
            if scripts.is_empty() {
                Script::Reject
            } else {
                scripts.remove(0)
            }
        };

        match script {
            Script::Reply(deltas) => {
                Ok(futures::stream::iter(deltas.into_iter().map(|d| Ok(d.to_string()))).boxed())
            }
            Script::BreakAfter(deltas) => {
                let mut items: Vec<Result<String>> =
                    deltas.into_iter().map(|d| Ok(d.to_string())).collect();
                items.push(Err(ChatError::Stream("connection reset".to_string()).into()));
                Ok(futures::stream::iter(items).boxed())
            }
            Script::Reject => Err(ChatError::Provider("Endpoint returned 500".to_string()).into()),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
