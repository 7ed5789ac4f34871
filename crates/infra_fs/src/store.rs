//! JSON document store on the local filesystem
//!
//! Writes go to a temporary sibling file that is then renamed over the
//! target, so a crash mid-write leaves either the old or the new content,
//! never a truncated file.

use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use core_kernel::{DocumentStore, DomainPort, PortError};

use crate::error::StorageError;

/// Options for the filesystem store
///
/// # Example
///
/// ```rust
/// use infra_fs::StoreConfig;
///
/// let config = StoreConfig::default().pretty(false).create_dirs(true);
/// assert!(!config.pretty);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Indent written JSON
    pub pretty: bool,
    /// Create missing parent directories on write
    pub create_dirs: bool,
}

impl StoreConfig {
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            create_dirs: true,
        }
    }
}

/// [`DocumentStore`] backed by `tokio::fs`
#[derive(Debug, Clone, Default)]
pub struct FsDocumentStore {
    config: StoreConfig,
}

impl FsDocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    async fn read(&self, path: &Path) -> Result<Value, StorageError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| StorageError::malformed(path, e))
    }

    async fn write(&self, path: &Path, value: &Value) -> Result<(), StorageError> {
        let encoded = if self.config.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
        .map_err(|e| StorageError::encoding(path, e))?;

        if self.config.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::io(parent, e))?;
            }
        }

        let temp = temp_path(path);
        if let Err(e) = fs::write(&temp, &encoded).await {
            return Err(StorageError::io(&temp, e));
        }
        if let Err(e) = fs::rename(&temp, path).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "Could not remove temporary file");
            }
            return Err(StorageError::io(path, e));
        }

        debug!(path = %path.display(), bytes = encoded.len(), "Wrote JSON file");
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<(), StorageError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn list(&self, directory: &Path) -> Result<Vec<String>, StorageError> {
        let mut reader = match fs::read_dir(directory).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(directory, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| StorageError::io(directory, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.path().display().to_string());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// `<dir>/.<name>.<uuid>.tmp`, next to the target so the rename stays on
/// one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

impl DomainPort for FsDocumentStore {}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn exists(&self, path: &str) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read_json(&self, path: &str) -> Result<Value, PortError> {
        Ok(self.read(Path::new(path)).await?)
    }

    async fn write_json(&self, path: &str, value: &Value) -> Result<(), PortError> {
        Ok(self.write(Path::new(path), value).await?)
    }

    async fn delete_file(&self, path: &str) -> Result<(), PortError> {
        Ok(self.delete(Path::new(path)).await?)
    }

    async fn list_files(&self, directory: &str) -> Result<Vec<String>, PortError> {
        Ok(self.list(Path::new(directory)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path(Path::new("/docs/ledger.json"));
        assert_eq!(temp.parent(), Some(Path::new("/docs")));

        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".ledger.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.pretty);
        assert!(config.create_dirs);
    }
}
