//! Completion adapters - Implementations of the CompletionProvider port.
//!
//! - `PerplexityProvider` - HTTP client for the Perplexity chat-completion API
//! - `MockCompletionProvider` - Scripted responses for tests

mod mock_provider;
mod perplexity_provider;

pub use mock_provider::{frames, MockCompletionProvider, MockResponse};
pub use perplexity_provider::PerplexityProvider;
