//! Ledger error types
//!
//! These errors stay inside the crate: the service logs them and carries on,
//! since losing the ledger must never block saving a document.

use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger storage error: {0}")]
    Storage(#[from] PortError),

    #[error("Unreadable document {path}: {message}")]
    UnreadableDocument { path: String, message: String },
}
