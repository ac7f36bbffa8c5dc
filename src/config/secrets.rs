//! Secret storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the API key is persisted
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SecretsConfig {
    /// Path of the JSON secrets file
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl SecretsConfig {
    /// Validate secrets configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("secrets.path"));
        }
        Ok(())
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".perplexity-chat/secrets.json")
}
