//! Domain layer containing the chat bridge's core logic and types.
//!
//! # Module Organization
//!
//! - `conversation` - Messages, bounded context, reasoning filter, finalized answers
//! - `streaming` - Completion stream frame parsing
//! - `models` - Selectable model catalog

pub mod conversation;
pub mod models;
pub mod streaming;
