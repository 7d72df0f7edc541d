//! Server-sent events framing for streaming completions
//!
//! Chat-completion endpoints answer `stream=true` requests with a
//! `text/event-stream` body. Events are separated by blank lines; each
//! event carries one or more `data:` lines. This module only handles the
//! framing; decoding of the JSON payloads lives with the provider.

/// Terminal payload sent by OpenAI-compatible servers
pub const DONE_MARKER: &str = "[DONE]";

/// A single parsed SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, when present
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

impl SseEvent {
    /// Whether this event marks the end of the completion
    pub fn is_done(&self) -> bool {
        self.data == DONE_MARKER
    }
}

/// Incremental SSE decoder
///
/// Bytes are buffered until a blank line completes an event, so chunk
/// boundaries may fall anywhere, including inside a multi-byte character.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body and return every completed event
    ///
    /// # Examples
    ///
    /// ```
    /// use llamachat::providers::sse::SseBuffer;
    ///
    /// let mut sse = SseBuffer::new();
    /// assert!(sse.push(b"data: hel").is_empty());
    /// let events = sse.push(b"lo\n\n");
    /// assert_eq!(events[0].data, "hello");
    /// ```
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        // CR only ever appears as part of a line ending in SSE
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(event) = parse_event(&block[..pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event that was not terminated by a blank line
    pub fn finish(&mut self) -> Option<SseEvent> {
        let block = std::mem::take(&mut self.buffer);
        parse_event(&block)
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_event(block: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(block);
    let mut data_lines: Vec<&str> = Vec::new();
    let mut event: Option<String> = None;

    for line in text.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim().to_string());
        }
        // Comments (`:`), `id:` and `retry:` carry nothing we use.
    }

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim().is_empty() {
        return None;
    }

    Some(SseEvent { event, data })
}
