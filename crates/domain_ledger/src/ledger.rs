//! The ledger state
//!
//! Two things are kept together and persisted as one JSON file:
//!
//! - **Counters**: the highest invoice number issued in each month. Counters
//!   only ever go up on save; a delete may lower one, but only by rebuilding
//!   it from the invoices that still exist.
//! - **Entries**: one per saved document file, used for the recent list.
//!
//! This type holds no I/O. [`crate::LedgerService`] owns a ledger behind a
//! lock and persists it.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use core_kernel::{to_safe_number, MonthKey};

use crate::entry::LedgerEntry;
use crate::numbering::format_number;

/// The next number to use for an invoice dated in `month_key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumber {
    pub number: String,
    pub month_key: MonthKey,
}

/// Per-month counters and saved document entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    counters: BTreeMap<MonthKey, u32>,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest number issued in `month`, 0 if none
    pub fn counter(&self, month: &MonthKey) -> u32 {
        self.counters.get(month).copied().unwrap_or(0)
    }

    pub fn counters(&self) -> &BTreeMap<MonthKey, u32> {
        &self.counters
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn find(&self, file_path: &str) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.file_path == file_path)
    }

    /// Counter + 1 for the month of `date`; does not reserve anything
    pub fn next_number(&self, date: NaiveDate) -> NextNumber {
        let month_key = MonthKey::from_date(date);
        NextNumber {
            number: format_number(self.counter(&month_key).saturating_add(1)),
            month_key,
        }
    }

    /// Inserts or replaces the entry for its file path
    ///
    /// Saving a numbered document raises its month counter to the document
    /// number when that is higher. Counters never go down here.
    pub fn upsert(&mut self, entry: LedgerEntry) -> Option<LedgerEntry> {
        if entry.is_numbered() {
            self.raise_counter(entry.month_key, entry.numeric_value());
        }

        match self.entries.iter_mut().find(|e| e.file_path == entry.file_path) {
            Some(existing) => Some(std::mem::replace(existing, entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Removes the entry for `file_path`; counters are left untouched
    pub fn remove(&mut self, file_path: &str) -> Option<LedgerEntry> {
        let index = self.entries.iter().position(|e| e.file_path == file_path)?;
        Some(self.entries.remove(index))
    }

    /// Numbered entries whose date falls in `month`
    pub fn numbered_entries_in(&self, month: MonthKey) -> impl Iterator<Item = &LedgerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.is_numbered() && e.month_key == month)
    }

    /// High-water update: keeps the larger of the current counter and `value`
    pub fn raise_counter(&mut self, month: MonthKey, value: u32) {
        let counter = self.counters.entry(month).or_insert(0);
        if value > *counter {
            *counter = value;
        }
    }

    /// Replaces a counter outright; only rebuilds may lower a counter
    pub fn set_counter(&mut self, month: MonthKey, value: u32) {
        self.counters.insert(month, value);
    }

    /// Replaces every entry and recomputes all counters from them
    pub fn replace_entries(&mut self, entries: Vec<LedgerEntry>) {
        self.counters.clear();
        self.entries.clear();
        for entry in entries {
            self.upsert(entry);
        }
    }

    /// Persisted form: `{"counters": {"YYYYMM": n}, "entries": [...]}`
    pub fn to_json(&self) -> Value {
        let counters: Map<String, Value> = self
            .counters
            .iter()
            .map(|(month, value)| (month.to_string(), json!(value)))
            .collect();
        let entries: Vec<Value> = self
            .entries
            .iter()
            .filter_map(|entry| serde_json::to_value(entry).ok())
            .collect();

        json!({ "counters": counters, "entries": entries })
    }

    /// Reads the persisted form, skipping whatever cannot be read
    ///
    /// Returns the ledger and the number of counters and entries that were
    /// dropped. A value that is not an object yields an empty ledger.
    pub fn from_json(value: &Value) -> (Self, usize) {
        let mut ledger = Ledger::new();
        let mut skipped = 0;

        if let Some(counters) = value.get("counters").and_then(Value::as_object) {
            for (key, raw) in counters {
                match key.parse::<MonthKey>() {
                    Ok(month) => {
                        let count = to_safe_number(raw, Decimal::ZERO)
                            .trunc()
                            .to_u32()
                            .unwrap_or(u32::MAX);
                        ledger.raise_counter(month, count);
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Skipping unreadable ledger counter");
                        skipped += 1;
                    }
                }
            }
        }

        if let Some(entries) = value.get("entries").and_then(Value::as_array) {
            for raw in entries {
                match serde_json::from_value::<LedgerEntry>(raw.clone()) {
                    Ok(entry) => {
                        // Keep counters consistent even if the file lost a counter
                        ledger.upsert(entry);
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable ledger entry");
                        skipped += 1;
                    }
                }
            }
        }

        (ledger, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::DocumentType;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(path: &str, number: &str, on: NaiveDate) -> LedgerEntry {
        LedgerEntry::new(path, format!("Facture {}", number), number, DocumentType::Invoice, on)
    }

    #[test]
    fn test_empty_ledger_starts_at_one() {
        let ledger = Ledger::new();
        let next = ledger.next_number(date(2024, 5, 3));
        assert_eq!(next.number, "0001");
        assert_eq!(next.month_key.to_string(), "202405");
    }

    #[test]
    fn test_counters_are_per_month() {
        let mut ledger = Ledger::new();
        ledger.upsert(invoice("/d/a.json", "0004", date(2024, 5, 3)));

        assert_eq!(ledger.next_number(date(2024, 5, 31)).number, "0005");
        assert_eq!(ledger.next_number(date(2024, 6, 1)).number, "0001");
    }

    #[test]
    fn test_upsert_replaces_by_path() {
        let mut ledger = Ledger::new();
        ledger.upsert(invoice("/d/a.json", "0001", date(2024, 5, 3)));
        let previous = ledger.upsert(invoice("/d/a.json", "0002", date(2024, 5, 3)));

        assert_eq!(previous.map(|e| e.number), Some("0001".to_string()));
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.counter(&MonthKey::new(2024, 5).unwrap()), 2);
    }

    #[test]
    fn test_lower_number_does_not_lower_counter() {
        let mut ledger = Ledger::new();
        ledger.upsert(invoice("/d/a.json", "0009", date(2024, 5, 3)));
        ledger.upsert(invoice("/d/b.json", "0003", date(2024, 5, 4)));

        assert_eq!(ledger.counter(&MonthKey::new(2024, 5).unwrap()), 9);
    }

    #[test]
    fn test_unnumbered_documents_leave_counters_alone() {
        let mut ledger = Ledger::new();
        ledger.upsert(LedgerEntry::new("/d/q.json", "Devis", "0050", DocumentType::Quote, date(2024, 5, 3)));

        assert!(ledger.counters().is_empty());
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let mut ledger = Ledger::new();
        ledger.upsert(invoice("/d/a.json", "0002", date(2024, 5, 3)).with_saved_at(10));
        ledger.upsert(invoice("/d/b.json", "0001", date(2024, 6, 3)).with_saved_at(20));

        let value = ledger.to_json();
        assert_eq!(value["counters"]["202405"], json!(2));
        assert_eq!(value["counters"]["202406"], json!(1));

        let (back, skipped) = Ledger::from_json(&value);
        assert_eq!(skipped, 0);
        assert_eq!(back, ledger);
    }

    #[test]
    fn test_far_future_counter_survives_reload() {
        let mut ledger = Ledger::new();
        ledger.upsert(invoice("/d/far.json", "0003", date(12024, 7, 1)));

        let (back, _) = Ledger::from_json(&ledger.to_json());
        assert_eq!(back.counter(&MonthKey::new(9999, 7).unwrap()), 3);
        assert_eq!(back.next_number(date(12024, 7, 2)).number, "0004");
    }

    #[test]
    fn test_from_json_skips_bad_parts() {
        let value = json!({
            "counters": {"202405": 7, "not-a-month": 3, "202406": "2"},
            "entries": [
                {"filePath": "/d/a.json"},
                {
                    "filePath": "/d/b.json", "displayName": "Facture 0001", "number": "0001",
                    "documentType": "invoice", "date": "2024-05-03", "monthKey": "202405",
                    "savedAtEpochMs": 5
                }
            ]
        });

        let (ledger, skipped) = Ledger::from_json(&value);
        assert_eq!(skipped, 2);
        assert_eq!(ledger.counter(&MonthKey::new(2024, 5).unwrap()), 7);
        assert_eq!(ledger.counter(&MonthKey::new(2024, 6).unwrap()), 2);
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        let (ledger, skipped) = Ledger::from_json(&json!([1, 2, 3]));
        assert_eq!(ledger, Ledger::new());
        assert_eq!(skipped, 0);
    }

    proptest! {
        #[test]
        fn prop_counter_is_max_of_saved_numbers(numbers in prop::collection::vec(1u32..5000, 1..20)) {
            let mut ledger = Ledger::new();
            for (i, n) in numbers.iter().enumerate() {
                let path = format!("/d/{}.json", i);
                ledger.upsert(invoice(&path, &format_number(*n), date(2024, 5, 3)));
            }

            let max = numbers.iter().copied().max().unwrap_or(0);
            prop_assert_eq!(ledger.counter(&MonthKey::new(2024, 5).unwrap()), max);
            prop_assert_eq!(ledger.next_number(date(2024, 5, 20)).number, format_number(max + 1));
        }
    }
}
