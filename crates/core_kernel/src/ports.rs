//! Ports and Adapters Infrastructure
//!
//! The invoicing core never touches the filesystem directly. Everything it
//! needs from durable storage goes through the [`DocumentStore`] port, which
//! is implemented by the filesystem adapter in `infra_fs` and by an
//! in-memory mock for tests.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   LedgerService / DocumentWorkflow            │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │          DocumentStore (port trait)           │
//! └──────────────────────────────────────────────┘
//!              ▲                      ▲
//!   ┌──────────┴─────────┐  ┌─────────┴──────────┐
//!   │  FsDocumentStore   │  │ InMemoryDocument-  │
//!   │  (tokio::fs)       │  │ Store (mock)       │
//!   └────────────────────┘  └────────────────────┘
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all store implementations must use.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested file was not found
    #[error("Not found: {entity_type} at {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// Reading or writing the underlying medium failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The stored content could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates an Io error without a source
    pub fn io(message: impl Into<String>) -> Self {
        PortError::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        PortError::Serialization {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates the file was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Durable storage for JSON document snapshots and the ledger state file
///
/// Paths are opaque strings owned by the caller. Implementations must make
/// [`DocumentStore::delete_file`] idempotent: deleting a path that does not
/// exist succeeds.
#[async_trait]
pub trait DocumentStore: DomainPort {
    /// Returns true if a file exists at `path`
    async fn exists(&self, path: &str) -> bool;

    /// Reads and parses the JSON file at `path`
    ///
    /// # Errors
    ///
    /// - `PortError::NotFound` if there is no such file
    /// - `PortError::Serialization` if the content is not valid JSON
    async fn read_json(&self, path: &str) -> Result<Value, PortError>;

    /// Writes `value` as JSON to `path`, replacing any previous content
    async fn write_json(&self, path: &str, value: &Value) -> Result<(), PortError>;

    /// Deletes the file at `path`
    async fn delete_file(&self, path: &str) -> Result<(), PortError>;

    /// Lists the files directly inside `directory`, sorted by path
    async fn list_files(&self, directory: &str) -> Result<Vec<String>, PortError>;
}

/// In-memory implementation of [`DocumentStore`] for testing
///
/// Paths are treated as `/`-separated keys. Besides well-formed JSON files it
/// can hold corrupt files and can be told to fail writes, which lets tests
/// exercise the best-effort paths of the ledger.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Clone)]
    enum StoredFile {
        Json(Value),
        Corrupt(String),
    }

    /// In-memory mock implementation of DocumentStore
    #[derive(Debug, Default)]
    pub struct InMemoryDocumentStore {
        files: Arc<RwLock<BTreeMap<String, StoredFile>>>,
        fail_writes: AtomicBool,
    }

    impl InMemoryDocumentStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with JSON files
        pub async fn with_files(files: Vec<(String, Value)>) -> Self {
            let store = Self::new();
            for (path, value) in files {
                store.files.write().await.insert(path, StoredFile::Json(value));
            }
            store
        }

        /// Places a file at `path` whose content is not valid JSON
        pub async fn insert_corrupt(&self, path: impl Into<String>, content: impl Into<String>) {
            self.files
                .write()
                .await
                .insert(path.into(), StoredFile::Corrupt(content.into()));
        }

        /// Removes a file behind the back of any service using the store
        pub async fn remove_out_of_band(&self, path: &str) {
            self.files.write().await.remove(path);
        }

        /// Makes every subsequent write fail (or succeed again)
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Returns the JSON stored at `path`, if any
        pub async fn get(&self, path: &str) -> Option<Value> {
            match self.files.read().await.get(path) {
                Some(StoredFile::Json(value)) => Some(value.clone()),
                _ => None,
            }
        }

        /// Number of files currently stored
        pub async fn len(&self) -> usize {
            self.files.read().await.len()
        }

        /// Returns true if the store holds no files
        pub async fn is_empty(&self) -> bool {
            self.files.read().await.is_empty()
        }
    }

    impl DomainPort for InMemoryDocumentStore {}

    #[async_trait]
    impl DocumentStore for InMemoryDocumentStore {
        async fn exists(&self, path: &str) -> bool {
            self.files.read().await.contains_key(path)
        }

        async fn read_json(&self, path: &str) -> Result<Value, PortError> {
            match self.files.read().await.get(path) {
                Some(StoredFile::Json(value)) => Ok(value.clone()),
                Some(StoredFile::Corrupt(content)) => Err(PortError::serialization(format!(
                    "{} is not valid JSON ({} bytes)",
                    path,
                    content.len()
                ))),
                None => Err(PortError::not_found("File", path)),
            }
        }

        async fn write_json(&self, path: &str, value: &Value) -> Result<(), PortError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PortError::io(format!("write to {} refused", path)));
            }
            self.files
                .write()
                .await
                .insert(path.to_string(), StoredFile::Json(value.clone()));
            Ok(())
        }

        async fn delete_file(&self, path: &str) -> Result<(), PortError> {
            self.files.write().await.remove(path);
            Ok(())
        }

        async fn list_files(&self, directory: &str) -> Result<Vec<String>, PortError> {
            let prefix = format!("{}/", directory.trim_end_matches('/'));
            Ok(self
                .files
                .read()
                .await
                .keys()
                .filter(|p| {
                    p.strip_prefix(&prefix)
                        .map(|rest| !rest.is_empty() && !rest.contains('/'))
                        .unwrap_or(false)
                })
                .cloned()
                .collect())
        }
    }
}
