//! Reasoning markup removal.
//!
//! Reasoning models interleave their deliberation between `<think>` and
//! `</think>` markers. That text is shown while streaming but must not be part
//! of the finalized answer or the stored context.

/// Marker that opens a reasoning block.
pub const REASONING_OPEN: &str = "<think>";

/// Marker that closes a reasoning block.
pub const REASONING_CLOSE: &str = "</think>";

/// Strips reasoning blocks from finalized answer text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasoningFilter;

impl ReasoningFilter {
    pub fn new() -> Self {
        Self
    }

    /// Removes every reasoning block from `text`.
    ///
    /// For each block, the text before the open marker is kept and the text
    /// after the close marker is trimmed and appended. An open marker with no
    /// close marker after it truncates the text at the open marker.
    pub fn finalize(&self, text: &str) -> String {
        let mut current = text.to_string();

        while let Some(open) = current.find(REASONING_OPEN) {
            let after_open = open + REASONING_OPEN.len();
            current = match current[after_open..].find(REASONING_CLOSE) {
                Some(close) => {
                    let rest = &current[after_open + close + REASONING_CLOSE.len()..];
                    format!("{}{}", &current[..open], rest.trim())
                }
                None => current[..open].to_string(),
            };
        }

        current
    }
}
