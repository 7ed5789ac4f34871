//! Ledger service
//!
//! Owns the in-memory [`Ledger`] for the lifetime of the process and keeps
//! the state file in sync after every mutation. Document files are the
//! source of truth for existence; the ledger is an index over them.
//!
//! Every ledger failure is logged and swallowed. A missing or corrupt state
//! file gives an empty ledger, a failed write leaves the in-memory state
//! ahead of the file until the next successful flush.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use core_kernel::{DocumentStore, MonthKey};
use domain_billing::DocumentSnapshot;

use crate::entry::LedgerEntry;
use crate::error::LedgerError;
use crate::ledger::{Ledger, NextNumber};

/// Outcome of [`LedgerService::reindex`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Documents read from the directory
    pub indexed: usize,
    /// Files in the directory that could not be read as documents
    pub skipped: usize,
    /// Entries outside the directory kept because their file still exists
    pub kept: usize,
}

/// Sequence numbering and recent documents, backed by a JSON state file
pub struct LedgerService {
    store: Arc<dyn DocumentStore>,
    state_path: String,
    /// Mutations hold this lock across their store I/O and the flush
    ledger: Mutex<Ledger>,
}

impl LedgerService {
    /// Loads the state file, falling back to an empty ledger
    pub async fn load(store: Arc<dyn DocumentStore>, state_path: impl Into<String>) -> Self {
        let state_path = state_path.into();
        let ledger = read_state(store.as_ref(), &state_path).await;

        Self {
            store,
            state_path,
            ledger: Mutex::new(ledger),
        }
    }

    pub fn state_path(&self) -> &str {
        &self.state_path
    }

    /// Suggested number for an invoice dated `date`
    ///
    /// Nothing is reserved: the counter only moves when a document is saved.
    pub async fn get_next_number(&self, date: NaiveDate) -> NextNumber {
        let next = self.ledger.lock().await.next_number(date);
        debug!(month = %next.month_key, number = %next.number, "Next invoice number");
        next
    }

    /// Most recently saved invoices whose file still exists, newest first
    pub async fn list_recent(&self, limit: usize) -> Vec<LedgerEntry> {
        if limit == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<LedgerEntry> = {
            let ledger = self.ledger.lock().await;
            ledger.entries().iter().filter(|e| e.is_numbered()).cloned().collect()
        };
        candidates.sort_by(|a, b| b.saved_at_epoch_ms.cmp(&a.saved_at_epoch_ms));

        let mut recent = Vec::with_capacity(limit.min(candidates.len()));
        for entry in candidates {
            if recent.len() == limit {
                break;
            }
            if self.store.exists(&entry.file_path).await {
                recent.push(entry);
            } else {
                debug!(path = %entry.file_path, "Skipping recent entry without a file");
            }
        }
        recent
    }

    /// Records a successful document save
    pub async fn record_save(&self, entry: LedgerEntry) {
        let mut ledger = self.ledger.lock().await;

        info!(
            path = %entry.file_path,
            number = %entry.number,
            month = %entry.month_key,
            document_type = %entry.document_type,
            "Recording document save"
        );
        ledger.upsert(entry);

        self.persist_or_warn(&ledger).await;
    }

    /// Records a document deletion
    ///
    /// Deleting an invoice rebuilds its month counter from the invoices that
    /// still exist, which frees the highest number if it was the one removed.
    pub async fn record_delete(&self, file_path: &str) -> Option<LedgerEntry> {
        let mut ledger = self.ledger.lock().await;

        let removed = ledger.remove(file_path);
        match &removed {
            Some(entry) if entry.is_numbered() => {
                let month = entry.month_key;
                let rebuilt = self.rebuild_counter(&ledger, month).await;
                info!(path = %file_path, month = %month, counter = rebuilt, "Rebuilt month counter after delete");
                ledger.set_counter(month, rebuilt);
            }
            Some(_) => debug!(path = %file_path, "Removed unnumbered document from ledger"),
            None => debug!(path = %file_path, "Deleted document was not in the ledger"),
        }

        self.persist_or_warn(&ledger).await;
        removed
    }

    /// Rebuilds the ledger from the documents found in `directory`
    ///
    /// Entries for files elsewhere are kept while their file exists. All
    /// counters are recomputed from the resulting entries.
    pub async fn reindex(&self, directory: &str) -> ReindexReport {
        let mut ledger = self.ledger.lock().await;
        let mut report = ReindexReport::default();

        let files = match self.store.list_files(directory).await {
            Ok(files) => files,
            Err(e) => {
                warn!(directory, error = %e, "Cannot list documents, ledger left unchanged");
                return report;
            }
        };

        let mut entries = Vec::new();
        for path in files.iter().filter(|p| p.ends_with(".json") && **p != self.state_path) {
            match self.read_document(path).await {
                Ok(snapshot) => {
                    let saved_at = ledger
                        .find(path)
                        .map(|e| e.saved_at_epoch_ms)
                        .unwrap_or_else(LedgerEntry::now_epoch_ms);
                    entries.push(LedgerEntry::from_snapshot(path.as_str(), &snapshot, saved_at));
                    report.indexed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping file during reindex");
                    report.skipped += 1;
                }
            }
        }

        for entry in ledger.entries() {
            if files.contains(&entry.file_path) {
                continue;
            }
            if self.store.exists(&entry.file_path).await {
                entries.push(entry.clone());
                report.kept += 1;
            }
        }

        ledger.replace_entries(entries);
        info!(
            directory,
            indexed = report.indexed,
            skipped = report.skipped,
            kept = report.kept,
            "Ledger reindexed"
        );

        self.persist_or_warn(&ledger).await;
        report
    }

    /// Writes the current state to the state file, logging failures
    pub async fn flush(&self) {
        let ledger = self.ledger.lock().await;
        self.persist_or_warn(&ledger).await;
    }

    /// A copy of the in-memory ledger
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.lock().await.clone()
    }

    async fn rebuild_counter(&self, ledger: &Ledger, month: MonthKey) -> u32 {
        let candidates: Vec<LedgerEntry> = ledger.numbered_entries_in(month).cloned().collect();

        let mut highest = 0;
        for entry in candidates {
            if self.still_counts(&entry).await {
                highest = highest.max(entry.numeric_value());
            }
        }
        highest
    }

    /// A file counts if it exists and still reads as JSON
    async fn still_counts(&self, entry: &LedgerEntry) -> bool {
        if !self.store.exists(&entry.file_path).await {
            return false;
        }
        match self.store.read_json(&entry.file_path).await {
            Ok(_) => true,
            Err(e) => {
                warn!(path = %entry.file_path, error = %e, "Unreadable document ignored in counter rebuild");
                false
            }
        }
    }

    async fn read_document(&self, path: &str) -> Result<DocumentSnapshot, LedgerError> {
        let value = self.store.read_json(path).await?;
        DocumentSnapshot::from_json(value).map_err(|e| LedgerError::UnreadableDocument {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    async fn persist(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        self.store.write_json(&self.state_path, &ledger.to_json()).await?;
        debug!(path = %self.state_path, entries = ledger.entries().len(), "Ledger flushed");
        Ok(())
    }

    async fn persist_or_warn(&self, ledger: &Ledger) {
        if let Err(e) = self.persist(ledger).await {
            warn!(path = %self.state_path, error = %e, "Failed to write ledger file");
        }
    }
}

async fn read_state(store: &dyn DocumentStore, path: &str) -> Ledger {
    if !store.exists(path).await {
        info!(path, "No ledger file yet, starting empty");
        return Ledger::new();
    }

    match store.read_json(path).await {
        Ok(value) => {
            let (ledger, skipped) = Ledger::from_json(&value);
            if skipped > 0 {
                warn!(path, skipped, "Ledger file had unreadable parts");
            }
            info!(
                path,
                entries = ledger.entries().len(),
                months = ledger.counters().len(),
                "Ledger loaded"
            );
            ledger
        }
        Err(e) => {
            warn!(path, error = %e, "Ledger file unreadable, starting empty");
            Ledger::new()
        }
    }
}
