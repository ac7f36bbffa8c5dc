//! Adapters - Implementations of the port interfaces.
//!
//! - `completion` - Perplexity HTTP client and scripted mock
//! - `secrets` - File and in-memory secret stores
//! - `bridge` - UI event sinks and the JSON-lines panel bridge

pub mod bridge;
pub mod completion;
pub mod secrets;
