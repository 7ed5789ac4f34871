//! Application Layer
//!
//! Wires the invoicing core together for the desktop shell:
//!
//! - **Config**: `FACTURATION_*` environment settings
//! - **Workflow**: new/open/save/delete of documents, with the ledger kept
//!   in step
//! - **Telemetry**: tracing subscriber setup shared by the binaries
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_app::{AppConfig, DocumentWorkflow};
//!
//! let config = AppConfig::from_env()?;
//! let store = Arc::new(FsDocumentStore::default());
//! let workflow = DocumentWorkflow::from_config(&config, store).await;
//!
//! let mut invoice = workflow.new_document(DocumentType::Invoice, today).await;
//! let path = workflow.suggested_path(&invoice);
//! workflow.save(&mut invoice, &path).await?;
//! ```

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflow;

pub use config::AppConfig;
pub use error::AppError;
pub use workflow::DocumentWorkflow;
