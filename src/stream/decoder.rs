use tracing::debug;

use super::chunk::StreamChunk;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Content of one well-formed chunk and the payload length it came from.
    Delta { content: String, bytes: u64 },
    /// The `[DONE]` sentinel; nothing after it is consumed.
    Done,
    /// A payload that did not parse as a chunk.
    Malformed { payload: String },
}

/// Incremental line decoder for one response body.
///
/// Bytes may arrive split at any position, including inside a UTF-8
/// sequence; only complete lines are decoded.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl LineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the sentinel has been seen.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds a network chunk and returns the events of every line it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = self.decode_line(&line) {
                events.push(event);
                if self.finished {
                    self.buffer.clear();
                    break;
                }
            }
        }
        events
    }

    /// Decodes a trailing line left without a newline when the body closed.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.finished || self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<StreamEvent> {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim();
        if line.is_empty() {
            return None;
        }
        // Comments and `event:`/`id:`/`retry:` fields carry no delta.
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload == DONE_SENTINEL {
            self.finished = true;
            return Some(StreamEvent::Done);
        }
        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => Some(StreamEvent::Delta {
                content: chunk.into_content(),
                bytes: payload.len() as u64,
            }),
            Err(err) => {
                debug!("Malformed stream chunk: {}", err);
                Some(StreamEvent::Malformed {
                    payload: payload.to_owned(),
                })
            }
        }
    }
}

/// Decodes a complete sequence of lines, stopping after the sentinel.
#[must_use]
pub fn decode_lines<I, S>(lines: I) -> Vec<StreamEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoder = LineDecoder::new();
    let mut events = Vec::new();
    for line in lines {
        if decoder.is_finished() {
            break;
        }
        if let Some(event) = decoder.decode_line(line.as_ref().as_bytes()) {
            events.push(event);
        }
    }
    events
}
