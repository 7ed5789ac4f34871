//! Ledger Domain - Document Numbering and Recent Documents
//!
//! Invoices are numbered per calendar month (`0001`, `0002`, ...). The
//! ledger remembers the highest number saved in each month and an entry for
//! every saved document file, and persists both as a single JSON file.
//!
//! - **Numbering**: the next number is the month counter + 1; saving raises
//!   the counter to the saved number if higher (high-water mark)
//! - **Deletes**: removing an invoice recomputes its month counter from the
//!   invoices still on disk
//! - **Recent list**: saved invoices whose file still exists, newest first
//!
//! # Example
//!
//! ```rust,ignore
//! let ledger = LedgerService::load(store, "documents/ledger.json").await;
//! let next = ledger.get_next_number(date).await;
//! // ... write the document ...
//! ledger.record_save(LedgerEntry::from_snapshot(path, &snapshot, LedgerEntry::now_epoch_ms())).await;
//! ```

pub mod numbering;
pub mod entry;
pub mod ledger;
pub mod service;
pub mod error;

pub use numbering::{format_number, parse_number};
pub use entry::LedgerEntry;
pub use ledger::{Ledger, NextNumber};
pub use service::{LedgerService, ReindexReport};
pub use error::LedgerError;
