//! Ledger entries
//!
//! One entry per saved document file. Entries are keyed by file path: saving
//! the same file again replaces its entry.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::MonthKey;
use domain_billing::{DocumentSnapshot, DocumentType};

use crate::numbering::parse_number;

/// What the ledger remembers about one saved document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Path of the document file, unique within the ledger
    pub file_path: String,
    pub display_name: String,
    /// Document number as entered, e.g. `0007`
    pub number: String,
    pub document_type: DocumentType,
    pub date: NaiveDate,
    pub month_key: MonthKey,
    /// Save time in milliseconds since the Unix epoch, used for ordering
    pub saved_at_epoch_ms: i64,
}

impl LedgerEntry {
    /// Creates an entry stamped with the current time
    pub fn new(
        file_path: impl Into<String>,
        display_name: impl Into<String>,
        number: impl Into<String>,
        document_type: DocumentType,
        date: NaiveDate,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            display_name: display_name.into(),
            number: number.into(),
            document_type,
            date,
            month_key: MonthKey::from_date(date),
            saved_at_epoch_ms: Self::now_epoch_ms(),
        }
    }

    /// Builds the entry for a document written to `file_path`
    pub fn from_snapshot(
        file_path: impl Into<String>,
        snapshot: &DocumentSnapshot,
        saved_at_epoch_ms: i64,
    ) -> Self {
        Self::new(
            file_path,
            snapshot.display_name(),
            snapshot.number(),
            snapshot.doc_type(),
            snapshot.date(),
        )
        .with_saved_at(saved_at_epoch_ms)
    }

    /// Milliseconds since the Unix epoch, for stamping saves
    pub fn now_epoch_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Overrides the save time
    pub fn with_saved_at(mut self, epoch_ms: i64) -> Self {
        self.saved_at_epoch_ms = epoch_ms;
        self
    }

    /// Numeric value of the document number, 0 if it has none
    pub fn numeric_value(&self) -> u32 {
        parse_number(&self.number)
    }

    /// Whether this entry takes part in sequential numbering
    pub fn is_numbered(&self) -> bool {
        self.document_type.is_auto_numbered()
    }
}
