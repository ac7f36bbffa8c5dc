//! Application layer - Orchestrates submissions and panel commands.
//!
//! - `ChatSession` drives one request from payload to finalized turn
//! - `ChatPanel` maps presentation-layer commands onto a session

mod chat_panel;
mod chat_session;

pub use chat_panel::ChatPanel;
pub use chat_session::{
    ChatError, ChatSession, ChatSessionConfig, SubmissionOutcome, TOO_MANY_MALFORMED_FRAMES,
};
