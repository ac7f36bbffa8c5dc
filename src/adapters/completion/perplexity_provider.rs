//! Perplexity Provider - Implementation of CompletionProvider over HTTP.
//!
//! Sends `POST {base_url}/chat/completions` with bearer authentication and
//! hands the streaming body back untouched. No read timeout is configured:
//! a stream runs until the server ends it.
//!
//! # Configuration
//!
//! ```ignore
//! let config = CompletionConfig::default();
//! let provider = PerplexityProvider::new(&config)?;
//! ```

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::CompletionConfig;
use crate::ports::{ChatRequest, CompletionError, CompletionProvider, ProviderResponse};

/// Streaming chat-completion client for the Perplexity API.
#[derive(Debug, Clone)]
pub struct PerplexityProvider {
    client: Client,
    completions_url: String,
}

impl PerplexityProvider {
    /// Creates a provider for the endpoint described by `config`.
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| CompletionError::Client(e.to_string()))?;

        Ok(Self {
            client,
            completions_url: config.completions_url(),
        })
    }

    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }
}

#[async_trait]
impl CompletionProvider for PerplexityProvider {
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        api_key: &SecretString,
    ) -> Result<ProviderResponse, CompletionError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(api_key.expose_secret())
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, connect = e.is_connect(), "Completion request failed");
                CompletionError::connection(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Completion request rejected");
            return Ok(ProviderResponse::Rejected {
                status: status.as_u16(),
                body: parse_error_body(&text),
            });
        }

        let body = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| CompletionError::stream(e.to_string()))
        });

        Ok(ProviderResponse::Streaming(Box::pin(body)))
    }
}

/// Parses an error body as JSON, falling back to the raw text.
fn parse_error_body(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}
