//! Document workflow
//!
//! The operations the desktop shell calls when the user creates, opens,
//! saves or deletes a document. Totals are recomputed on every open and
//! save; the ledger is told about saves and deletes after the document file
//! itself has been written or removed.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use core_kernel::{Currency, DocumentStore};
use domain_billing::{DocumentSnapshot, DocumentType};
use domain_ledger::{LedgerEntry, LedgerService, NextNumber, ReindexReport};

use crate::config::AppConfig;
use crate::error::AppError;

/// Entry point for document operations
pub struct DocumentWorkflow {
    store: Arc<dyn DocumentStore>,
    ledger: Arc<LedgerService>,
    documents_dir: String,
    currency: Currency,
}

impl DocumentWorkflow {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        ledger: Arc<LedgerService>,
        documents_dir: impl Into<String>,
        currency: Currency,
    ) -> Self {
        Self {
            store,
            ledger,
            documents_dir: documents_dir.into(),
            currency,
        }
    }

    /// Loads the ledger named in `config` and builds the workflow over `store`
    pub async fn from_config(config: &AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let ledger = LedgerService::load(store.clone(), config.ledger_path.as_str()).await;
        Self::new(store, Arc::new(ledger), config.documents_dir.as_str(), config.currency)
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    /// A blank document; invoices come pre-numbered for their month
    pub async fn new_document(&self, doc_type: DocumentType, date: NaiveDate) -> DocumentSnapshot {
        let number = if doc_type.is_auto_numbered() {
            self.ledger.get_next_number(date).await.number
        } else {
            String::new()
        };

        let mut snapshot = DocumentSnapshot::new(doc_type, number, date);
        snapshot.meta.currency = self.currency;
        snapshot
    }

    /// Reads a saved document and recomputes its totals
    pub async fn open(&self, path: &str) -> Result<DocumentSnapshot, AppError> {
        let value = self.store.read_json(path).await?;
        let snapshot = DocumentSnapshot::from_json(value)?;
        debug!(path, number = %snapshot.number(), "Opened document");
        Ok(snapshot)
    }

    /// Recomputes, writes the document, then records it in the ledger
    ///
    /// Only the document write can fail the save.
    pub async fn save(&self, snapshot: &mut DocumentSnapshot, path: &str) -> Result<LedgerEntry, AppError> {
        snapshot.recompute();
        let value = snapshot.to_json()?;
        self.store.write_json(path, &value).await?;

        let entry = LedgerEntry::from_snapshot(path, snapshot, LedgerEntry::now_epoch_ms());
        info!(
            path,
            document_type = %snapshot.doc_type(),
            number = %snapshot.number(),
            total_ttc = %snapshot.totals.total_ttc,
            "Saved document"
        );
        self.ledger.record_save(entry.clone()).await;
        Ok(entry)
    }

    /// Deletes the document file, then updates the ledger
    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.store.delete_file(path).await?;
        info!(path, "Deleted document");
        self.ledger.record_delete(path).await;
        Ok(())
    }

    pub async fn recent(&self, limit: usize) -> Vec<LedgerEntry> {
        self.ledger.list_recent(limit).await
    }

    pub async fn next_number(&self, date: NaiveDate) -> NextNumber {
        self.ledger.get_next_number(date).await
    }

    /// `<documents_dir>/<type>-<number>-<date>.json`
    ///
    /// Characters that do not belong in a file name are replaced by `-`;
    /// an empty number becomes `brouillon`.
    pub fn suggested_path(&self, snapshot: &DocumentSnapshot) -> String {
        let number: String = snapshot
            .number()
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        let number = if number.is_empty() { "brouillon".to_string() } else { number };

        let file_name = format!(
            "{}-{}-{}.json",
            snapshot.doc_type().slug(),
            number,
            snapshot.date().format("%Y-%m-%d")
        );
        PathBuf::from(&self.documents_dir)
            .join(file_name)
            .display()
            .to_string()
    }

    /// Rebuilds the ledger from the documents directory
    pub async fn reindex(&self) -> ReindexReport {
        self.ledger.reindex(&self.documents_dir).await
    }

    /// Flushes the ledger before the application exits
    pub async fn shutdown(&self) {
        self.ledger.flush().await;
    }
}
