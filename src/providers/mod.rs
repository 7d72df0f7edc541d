//! Provider module for llamachat
//!
//! This module contains the streaming completion abstraction and the
//! OpenAI-compatible implementation used to talk to inference servers.

pub mod base;
pub mod openai;
pub mod sse;

pub use base::{Message, Provider, Role, TokenStream};
pub use openai::OpenAiCompatProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if no endpoint is configured or the HTTP client cannot
/// be initialized
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OpenAiCompatProvider::new(config.clone())?))
}
