//! Decoder for the chat-completion event stream.
//!
//! Frames look like `data: {"content": {"type": "content_chunk", "content": "Hi"}}`
//! or `data: {"content": "Hi"}`; the stream ends with `data: [DONE]` or a frame
//! whose content is the string `[DONE]`.

use serde_json::Value;

pub const CONTENT_CHUNK: &str = "content_chunk";
const DONE: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Chunk { kind: String, content: String },
    Done,
}

impl StreamEvent {
    pub fn is_thinking(&self) -> bool {
        matches!(self, StreamEvent::Chunk { kind, .. } if kind.contains("thinking"))
    }
}

/// Buffers raw bytes and yields events for each complete line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = parse_line(line.trim_end_matches(['\r', '\n'])) {
                let done = event == StreamEvent::Done;
                events.push(event);
                if done {
                    self.finished = true;
                    self.buffer.clear();
                    break;
                }
            }
        }
        events
    }

    /// Flushes a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.finished || self.buffer.is_empty() {
            return Vec::new();
        }
        self.buffer.push(b'\n');
        self.push(&[])
    }
}

pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == DONE {
        return Some(StreamEvent::Done);
    }

    let frame: Value = serde_json::from_str(data).ok()?;
    match frame.get("content")? {
        Value::String(s) if s.trim() == DONE => Some(StreamEvent::Done),
        Value::String(s) if !s.is_empty() => Some(StreamEvent::Chunk {
            kind: CONTENT_CHUNK.to_string(),
            content: s.clone(),
        }),
        Value::Object(inner) => {
            let content = inner.get("content").and_then(Value::as_str)?;
            if content.is_empty() {
                return None;
            }
            let kind = inner
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or(CONTENT_CHUNK);
            Some(StreamEvent::Chunk {
                kind: kind.to_string(),
                content: content.to_string(),
            })
        }
        _ => None,
    }
}
