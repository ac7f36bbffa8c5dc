//! Events produced by the stream frame parser.

/// Why a completion stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalReason {
    /// Normal completion (`"stop"`, `[DONE]` or end of body).
    Stop,
    /// Any other finish reason reported by the server.
    Error(String),
}

/// A structured event extracted from the completion byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental answer text (may be empty).
    ContentDelta(String),
    /// Full citation list as of this frame; replaces any earlier list.
    CitationSnapshot(Vec<String>),
    /// The stream is over.
    Terminal(TerminalReason),
    /// A data line that could not be parsed. Not fatal.
    ParseError {
        /// The trimmed raw line.
        line: String,
        /// Parser error description.
        cause: String,
    },
}
