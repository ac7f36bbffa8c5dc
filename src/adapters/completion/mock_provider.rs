//! Mock Completion Provider for testing.
//!
//! Replays scripted response bodies so the orchestrator can be exercised
//! without calling the real API.
//!
//! # Features
//!
//! - Pre-configured bodies, split into arbitrary chunks
//! - Non-success responses with an error body
//! - Connection failures and mid-stream failures
//! - Call tracking for verification
//!
//! Lock poisoning panics; this adapter is for tests only.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockCompletionProvider::new()
//!     .with_stream(vec![frames::content("4"), frames::stop(&["a.com"])]);
//! ```

use async_trait::async_trait;
use futures::stream;
use secrecy::SecretString;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{ChatRequest, CompletionError, CompletionProvider, ProviderResponse};

/// Helpers for building event-stream frames.
pub mod frames {
    use serde_json::json;

    /// A data line carrying a content delta.
    pub fn content(text: &str) -> String {
        data_line(json!({"choices": [{"delta": {"content": text}}]}))
    }

    /// A data line ending the stream normally, with a citation snapshot.
    pub fn stop(citations: &[&str]) -> String {
        data_line(json!({
            "choices": [{"delta": {}, "finished_reason": "stop"}],
            "citations": citations,
        }))
    }

    /// A data line carrying only a citation snapshot.
    pub fn citations(citations: &[&str]) -> String {
        data_line(json!({"choices": [{"delta": {"content": ""}}], "citations": citations}))
    }

    /// A data line ending the stream with a non-stop finish reason.
    pub fn finish(reason: &str) -> String {
        data_line(json!({"choices": [{"delta": {}, "finished_reason": reason}]}))
    }

    fn data_line(payload: serde_json::Value) -> String {
        format!("data: {}\n", payload)
    }
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Successful status; the body is delivered as these chunks.
    Stream(Vec<Vec<u8>>),
    /// Successful status; the chunks are delivered, then the body breaks.
    StreamThenFail {
        chunks: Vec<Vec<u8>>,
        message: String,
    },
    /// Non-success status with a body.
    Rejected {
        status: u16,
        body: serde_json::Value,
    },
    /// The request never reaches the server.
    ConnectionFailure(String),
}

/// Mock completion provider for testing.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a body made of the given lines, one chunk per line.
    pub fn with_stream(self, lines: Vec<String>) -> Self {
        let chunks = lines.into_iter().map(String::into_bytes).collect();
        self.with_response(MockResponse::Stream(chunks))
    }

    /// Queues a body delivered in the exact chunks given.
    pub fn with_chunks(self, chunks: Vec<Vec<u8>>) -> Self {
        self.with_response(MockResponse::Stream(chunks))
    }

    /// Queues a non-success response.
    pub fn with_rejection(self, status: u16, body: serde_json::Value) -> Self {
        self.with_response(MockResponse::Rejected { status, body })
    }

    /// Queues a connection failure.
    pub fn with_connection_failure(self, message: impl Into<String>) -> Self {
        self.with_response(MockResponse::ConnectionFailure(message.into()))
    }

    /// Queues any response.
    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses
            .lock()
            .expect("MockCompletionProvider: responses lock poisoned")
            .push_back(response);
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .expect("MockCompletionProvider: calls lock poisoned")
            .len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<ChatRequest> {
        self.calls
            .lock()
            .expect("MockCompletionProvider: calls lock poisoned")
            .clone()
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .expect("MockCompletionProvider: responses lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                MockResponse::Stream(vec![
                    frames::content("Mock response").into_bytes(),
                    frames::stop(&[]).into_bytes(),
                ])
            })
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        _api_key: &SecretString,
    ) -> Result<ProviderResponse, CompletionError> {
        self.calls
            .lock()
            .expect("MockCompletionProvider: calls lock poisoned")
            .push(request.clone());

        match self.next_response() {
            MockResponse::Stream(chunks) => Ok(ProviderResponse::Streaming(Box::pin(
                stream::iter(chunks.into_iter().map(Ok)),
            ))),
            MockResponse::StreamThenFail { chunks, message } => {
                let items = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(CompletionError::stream(message))));
                Ok(ProviderResponse::Streaming(Box::pin(stream::iter(items))))
            }
            MockResponse::Rejected { status, body } => {
                Ok(ProviderResponse::Rejected { status, body })
            }
            MockResponse::ConnectionFailure(message) => Err(CompletionError::connection(message)),
        }
    }
}
