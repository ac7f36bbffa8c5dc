//! Completion Provider Port - Interface to the streaming chat-completion API.
//!
//! The provider only deals with transport: it sends the request and hands the
//! raw response body back as a byte stream. Frame parsing, context handling
//! and UI events stay in the orchestrator, so the provider can be swapped for
//! a scripted mock in tests.
//!
//! # Example
//!
//! ```ignore
//! let request = ChatRequest::streaming("sonar", messages);
//! match provider.stream_chat(&request, &api_key).await? {
//!     ProviderResponse::Streaming(body) => { /* feed the frame parser */ }
//!     ProviderResponse::Rejected { status, body } => { /* surface body */ }
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use secrecy::SecretString;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;

use crate::domain::conversation::Message;

/// Response body as a stream of raw byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, CompletionError>> + Send>>;

/// Port for streaming chat completions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issues a chat-completion request.
    ///
    /// Returns `Err` only when no response could be obtained at all
    /// (connection refused, DNS failure, TLS error). A response with a
    /// non-success status is `Ok(ProviderResponse::Rejected)`.
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        api_key: &SecretString,
    ) -> Result<ProviderResponse, CompletionError>;
}

/// Body of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "sonar", "sonar-pro").
    pub model: String,
    /// System instruction, prior context, then the new user message.
    pub messages: Vec<Message>,
    /// Always true for this bridge.
    pub stream: bool,
}

impl ChatRequest {
    /// Creates a streaming request.
    pub fn streaming(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

/// What the endpoint answered with.
pub enum ProviderResponse {
    /// Successful status; the body is an event stream.
    Streaming(ByteStream),
    /// Non-success status with its (JSON if possible) error body.
    Rejected {
        status: u16,
        body: serde_json::Value,
    },
}

impl fmt::Debug for ProviderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderResponse::Streaming(_) => f.write_str("Streaming(..)"),
            ProviderResponse::Rejected { status, body } => f
                .debug_struct("Rejected")
                .field("status", status)
                .field("body", body)
                .finish(),
        }
    }
}

/// Completion transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// The request could not be delivered.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The body stream broke after the response started.
    #[error("stream interrupted: {0}")]
    Stream(String),

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
}

impl CompletionError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }
}
