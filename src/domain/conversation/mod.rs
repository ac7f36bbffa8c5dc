//! Conversation domain module.
//!
//! Messages, the bounded per-session context, reasoning markup removal and
//! the finalized answer type.

mod answer;
mod context;
mod message;
mod reasoning;

pub use answer::FinalizedAnswer;
pub use context::{ConversationContext, DEFAULT_CONTEXT_TURNS};
pub use message::{Message, Role};
pub use reasoning::{ReasoningFilter, REASONING_CLOSE, REASONING_OPEN};
