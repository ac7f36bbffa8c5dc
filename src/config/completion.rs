//! Completion endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::conversation::DEFAULT_CONTEXT_TURNS;
use crate::domain::models::DEFAULT_MODEL;

/// Completion endpoint and orchestration settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CompletionConfig {
    /// API base URL (without the `/chat/completions` path)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used until the panel selects one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// System instruction sent first in every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Turns (user/assistant pairs) kept in context
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Consecutive malformed frames tolerated before a submission is aborted
    #[serde(default = "default_max_parse_errors")]
    pub max_consecutive_parse_errors: u32,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl CompletionConfig {
    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Validate completion configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("completion.base_url"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.default_model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("completion.default_model"));
        }
        if self.context_turns == 0 {
            return Err(ValidationError::InvalidContextTurns);
        }
        if self.max_consecutive_parse_errors == 0 {
            return Err(ValidationError::InvalidParseErrorLimit);
        }
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            system_prompt: default_system_prompt(),
            context_turns: default_context_turns(),
            max_consecutive_parse_errors: default_max_parse_errors(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    "Make sure you are correct!".to_string()
}

fn default_context_turns() -> usize {
    DEFAULT_CONTEXT_TURNS
}

fn default_max_parse_errors() -> u32 {
    16
}

fn default_connect_timeout() -> u64 {
    30
}
