//! Streaming domain module.
//!
//! Parsing of the completion endpoint's event stream into typed events.

mod event;
mod frame_parser;

pub use event::{StreamEvent, TerminalReason};
pub use frame_parser::{FrameParser, DATA_PREFIX, DONE_SENTINEL, STOP_REASON};
