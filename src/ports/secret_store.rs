//! Secret Store Port - Interface for API key storage.
//!
//! Secrets are addressed by a fixed identifier and always travel as
//! `SecretString` so they are never printed by `Debug` or logged.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// Identifier the completion API key is stored under.
pub const API_KEY_SECRET_ID: &str = "perplexity-ext.apiKey";

/// Port for reading and writing secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the secret stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<SecretString>, SecretStoreError>;

    /// Stores (or replaces) the secret under `key`.
    async fn store(&self, key: &str, value: SecretString) -> Result<(), SecretStoreError>;
}

/// Errors from secret storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretStoreError {
    #[error("secret storage I/O error: {0}")]
    Io(String),

    #[error("secret storage is corrupt: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SecretStore) {}

    #[test]
    fn error_displays_correctly() {
        let err = SecretStoreError::Io("permission denied".to_string());
        assert_eq!(err.to_string(), "secret storage I/O error: permission denied");
    }
}
