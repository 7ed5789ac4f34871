//! Application error handling

use thiserror::Error;

use core_kernel::PortError;
use domain_billing::BillingError;

/// Errors surfaced to the desktop shell
///
/// Ledger problems never appear here: they are logged by the ledger service
/// and the user's save or delete goes through regardless.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),

    #[error("Document error: {0}")]
    Document(#[from] BillingError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        AppError::Configuration(message.into())
    }

    /// True when the error means the document file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Storage(e) if e.is_not_found())
    }
}
