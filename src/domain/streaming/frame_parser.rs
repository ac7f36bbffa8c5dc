//! Incremental parser for the completion event stream.
//!
//! The endpoint answers with newline-delimited server-sent events. Each data
//! line carries a JSON object:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"4"},"finished_reason":null}],"citations":["a.com"]}
//! ```
//!
//! Bytes arrive in arbitrary chunks, so a line may be split anywhere,
//! including inside the `data:` prefix or inside a multi-byte character.
//! The parser buffers raw bytes and only decodes complete lines.

use serde::Deserialize;

use super::event::{StreamEvent, TerminalReason};

/// Prefix of SSE data lines.
pub const DATA_PREFIX: &str = "data:";

/// Sentinel some OpenAI-compatible servers send after the last frame.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Finish reason that marks a normal completion.
pub const STOP_REASON: &str = "stop";

/// Turns completion body chunks into [`StreamEvent`]s.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
    finished: bool,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk and returns the events of every line it completes.
    ///
    /// Once a terminal event has been produced, further input is ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buffer.extend_from_slice(chunk);

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            self.classify_line(line.trim(), &mut events);

            if self.finished {
                self.buffer.clear();
                break;
            }
        }

        events
    }

    /// Signals the end of the body.
    ///
    /// A trailing line without a terminator is classified first. If no
    /// terminal event was seen, an implicit `Terminal(Stop)` is produced.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw);
            self.classify_line(line.trim(), &mut events);
        }

        if !self.finished {
            self.finished = true;
            events.push(StreamEvent::Terminal(TerminalReason::Stop));
        }

        events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn classify_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        // Blank separators, comments and non-data fields carry nothing for us.
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let payload = payload.trim_start();

        if payload == DONE_SENTINEL {
            self.terminate(TerminalReason::Stop, events);
            return;
        }

        let frame = match serde_json::from_str::<StreamFrame>(payload) {
            Ok(frame) => frame,
            Err(e) => {
                events.push(StreamEvent::ParseError {
                    line: line.to_string(),
                    cause: e.to_string(),
                });
                return;
            }
        };

        let choice = frame.choices.into_iter().next();
        let finish_reason = choice
            .as_ref()
            .and_then(StreamChoice::finish_reason)
            .map(str::to_string);
        let content = choice
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .unwrap_or_default();

        if finish_reason.is_none() || !content.is_empty() {
            events.push(StreamEvent::ContentDelta(content));
        }

        if let Some(citations) = frame.citations {
            events.push(StreamEvent::CitationSnapshot(citations));
        }

        match finish_reason.as_deref() {
            None => {}
            Some(STOP_REASON) => self.terminate(TerminalReason::Stop, events),
            Some(other) => self.terminate(TerminalReason::Error(other.to_string()), events),
        }
    }

    fn terminate(&mut self, reason: TerminalReason, events: &mut Vec<StreamEvent>) {
        self.finished = true;
        events.push(StreamEvent::Terminal(reason));
    }
}

// ----- Wire Types -----

#[derive(Debug, Deserialize)]
struct StreamFrame {
    choices: Vec<StreamChoice>,
    #[serde(default)]
    citations: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
    #[serde(default)]
    finished_reason: Option<String>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl StreamChoice {
    /// The non-empty finish reason, under either field name.
    fn finish_reason(&self) -> Option<&str> {
        self.finished_reason
            .as_deref()
            .or(self.finish_reason.as_deref())
            .filter(|reason| !reason.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
