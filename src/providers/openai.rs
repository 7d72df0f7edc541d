//! OpenAI-compatible provider implementation
//!
//! Talks to any server exposing `POST /v1/chat/completions` with streaming
//! support (llama.cpp server, vLLM, Ollama's OpenAI shim, ...).

use crate::config::ProviderConfig;
use crate::error::{ChatError, Result};
use crate::providers::sse::{SseBuffer, SseEvent};
use crate::providers::{Message, Provider, TokenStream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;

/// OpenAI-compatible streaming provider
///
/// # Examples
///
/// ```
/// use llamachat::config::ProviderConfig;
/// use llamachat::providers::OpenAiCompatProvider;
///
/// let cfg = ProviderConfig {
///     host: Some("127.0.0.1:8080".to_string()),
///     ..Default::default()
/// };
/// let provider = OpenAiCompatProvider::new(cfg).unwrap();
/// assert_eq!(provider.completions_url(), "http://127.0.0.1:8080/v1/chat/completions");
/// ```
pub struct OpenAiCompatProvider {
    client: Client,
    config: ProviderConfig,
    base_url: String,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    temperature: f32,
}

/// One `chat.completion.chunk` object
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns `ChatError::MissingHost` if no endpoint is configured, or an
    /// HTTP error if the client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let base_url = config.endpoint()?;
        let client = Client::builder()
            .user_agent(concat!("llamachat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ChatError::Http)?;

        tracing::info!(base_url = %base_url, model = %config.model, "Initialized completion provider");

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Full URL of the chat-completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    async fn stream_chat(&self, messages: &[Message], temperature: f32) -> Result<TokenStream> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            stream: true,
            temperature,
        };

        tracing::debug!(
            "Sending completion request: {} messages, temperature {}",
            messages.len(),
            temperature
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                ChatError::Provider(format!("Completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Endpoint returned error {}: {}", status, error_text);
            return Err(ChatError::Provider(format!(
                "Endpoint returned {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(content_deltas(response.bytes_stream()))
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

struct DeltaState {
    bytes: ByteStream,
    sse: SseBuffer,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl DeltaState {
    /// Queue the content of each event; `[DONE]` or a bad chunk finishes the stream
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            if event.is_done() {
                self.finished = true;
                return;
            }
            match decode_chunk(&event.data) {
                Ok(Some(content)) => self.pending.push_back(Ok(content)),
                Ok(None) => {}
                Err(e) => {
                    self.pending.push_back(Err(e));
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

/// Turn a raw `text/event-stream` body into a stream of content deltas
///
/// The stream ends at `[DONE]` or when the body ends. A transport error or
/// an undecodable chunk is yielded once as `Err` and ends the stream.
pub fn content_deltas<S>(byte_stream: S) -> TokenStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let state = DeltaState {
        bytes: Box::pin(byte_stream),
        sse: SseBuffer::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.sse.push(&chunk);
                    state.absorb(events);
                }
                Some(Err(e)) => {
                    tracing::error!("Completion stream interrupted: {}", e);
                    state
                        .pending
                        .push_back(Err(ChatError::Stream(e.to_string()).into()));
                    state.finished = true;
                }
                None => {
                    let tail = state.sse.finish().into_iter().collect();
                    state.absorb(tail);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

/// Extract `choices[0].delta.content` from a chunk payload
fn decode_chunk(data: &str) -> Result<Option<String>> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data)
        .map_err(|e| ChatError::Stream(format!("Invalid completion chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(ChatError::Provider(format!("Endpoint reported error: {}", error)).into());
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}
