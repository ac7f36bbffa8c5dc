//! Finalized answer produced at the end of a completion stream.

use serde::Serialize;

/// Visible answer text plus the citations that accompanied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizedAnswer {
    /// Answer text with reasoning markup removed.
    pub visible_text: String,
    /// Citation snapshot as last seen in the stream, in server order.
    pub citations: Vec<String>,
}

impl FinalizedAnswer {
    pub fn new(visible_text: impl Into<String>, citations: Vec<String>) -> Self {
        Self {
            visible_text: visible_text.into(),
            citations,
        }
    }

    /// Citations in the order they are surfaced to the presentation layer.
    ///
    /// The panel prepends each source as it arrives, so emitting the stored
    /// list back to front leaves it displayed in server order.
    pub fn citations_for_display(&self) -> impl Iterator<Item = &str> {
        self.citations.iter().rev().map(String::as_str)
    }
}
