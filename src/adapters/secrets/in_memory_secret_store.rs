//! In-memory secret store for tests.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{SecretStore, SecretStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    secrets: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `value` under `key`.
    pub fn with_secret(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut secrets = HashMap::new();
        secrets.insert(key.into(), value.into());
        Self {
            secrets: Arc::new(RwLock::new(secrets)),
        }
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>, SecretStoreError> {
        let secrets = self.secrets.read().await;
        Ok(secrets.get(key).cloned().map(SecretString::new))
    }

    async fn store(&self, key: &str, value: SecretString) -> Result<(), SecretStoreError> {
        let mut secrets = self.secrets.write().await;
        secrets.insert(key.to_string(), value.expose_secret().clone());
        Ok(())
    }
}
