//! Billing domain errors

use thiserror::Error;

/// Errors that can occur in the billing domain
///
/// The totals engine itself never fails; these only arise when a stored
/// document cannot be read back as a document at all.
#[derive(Debug, Error)]
pub enum BillingError {
    /// The JSON is not a document (missing meta, unknown type, bad date)
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The document could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}
