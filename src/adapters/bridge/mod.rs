//! UI bridge adapters - Implementations of the UiEventSink port.
//!
//! - `JsonLinesBridge` - Newline-delimited JSON over any async reader/writer
//! - `ChannelSink` - Forwards events into a tokio channel
//! - `RecordingSink` - Captures events for assertions

mod channel_sink;
mod json_lines;
mod recording_sink;

pub use channel_sink::ChannelSink;
pub use json_lines::{JsonLinesBridge, JsonLinesSink};
pub use recording_sink::RecordingSink;
