//! Filesystem Infrastructure Layer
//!
//! Implements the `DocumentStore` port over the local filesystem. Every
//! document and the ledger state are plain JSON files; there is no database.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_fs::{FsDocumentStore, StoreConfig};
//!
//! let store = Arc::new(FsDocumentStore::new(StoreConfig::default()));
//! let ledger = LedgerService::load(store, "documents/ledger.json").await;
//! ```

pub mod store;
pub mod error;

pub use store::{FsDocumentStore, StoreConfig};
pub use error::StorageError;
