//! Filesystem storage error types
//!
//! Adapter-level errors keep the path they happened on. At the port boundary
//! they are converted into [`PortError`], the only error type the domain
//! sees.

use std::io;
use std::path::Path;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur while reading or writing document files
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// The operating system refused the operation
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not valid JSON
    #[error("Malformed JSON in {path}: {message}")]
    Malformed { path: String, message: String },

    /// The value could not be encoded
    #[error("Failed to encode {path}: {message}")]
    Encoding { path: String, message: String },
}

impl StorageError {
    /// Wraps an I/O error, recognising missing files
    pub fn io(path: &Path, source: io::Error) -> Self {
        let path = path.display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(path)
        } else {
            StorageError::Io { path, source }
        }
    }

    pub fn malformed(path: &Path, error: serde_json::Error) -> Self {
        StorageError::Malformed {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    pub fn encoding(path: &Path, error: serde_json::Error) -> Self {
        StorageError::Encoding {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<StorageError> for PortError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(path) => PortError::not_found("File", path),
            StorageError::Io { path, source } => PortError::Io {
                message: format!("{}: {}", path, source),
                source: Some(Box::new(source)),
            },
            e @ (StorageError::Malformed { .. } | StorageError::Encoding { .. }) => {
                PortError::serialization(e.to_string())
            }
        }
    }
}
