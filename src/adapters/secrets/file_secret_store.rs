//! File-based Secret Store Adapter
//!
//! Keeps secrets as a flat JSON object (`{"id": "value"}`) in a single file.
//! The whole file is rewritten on every store: the new contents go to an
//! owner-only temp file beside it, which is then renamed over the original.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::ports::{SecretStore, SecretStoreError};

/// File-backed secret storage
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Create a store backed by the file at `path`
    ///
    /// The file and its parent directory are created on first store.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, SecretStoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| SecretStoreError::Io(e.to_string()))?;

        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&json).map_err(|e| SecretStoreError::Serialization(e.to_string()))
    }

    async fn write_all(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SecretStoreError::Io(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(secrets)
            .map_err(|e| SecretStoreError::Serialization(e.to_string()))?;

        let temp_path = self.temp_path();
        let mut file = open_owner_only(&temp_path).await.map_err(io_error)?;
        // A leftover temp file keeps its old mode; narrow it before writing.
        restrict_permissions(&temp_path).await.map_err(io_error)?;

        file.write_all(json.as_bytes()).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(io_error)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(e: std::io::Error) -> SecretStoreError {
    SecretStoreError::Io(e.to_string())
}

#[cfg(unix)]
async fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .await
}

#[cfg(not(unix))]
async fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>, SecretStoreError> {
        let mut secrets = self.read_all().await?;
        Ok(secrets.remove(key).map(SecretString::new))
    }

    async fn store(&self, key: &str, value: SecretString) -> Result<(), SecretStoreError> {
        let mut secrets = self.read_all().await?;
        secrets.insert(key.to_string(), value.expose_secret().clone());
        self.write_all(&secrets).await?;

        debug!(key, path = %self.path.display(), "Stored secret");
        Ok(())
    }
}
