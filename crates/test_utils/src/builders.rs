//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_billing::{
    ClientInfo, DocumentSnapshot, DocumentType, Extras, LineItem, WithholdingRule,
};
use domain_ledger::{format_number, LedgerEntry};

use crate::fixtures::DateFixtures;

/// Builder for line items
pub struct LineItemBuilder {
    item: LineItem,
}

impl Default for LineItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemBuilder {
    /// One unit at 100 DT, 19% TVA, no discount
    pub fn new() -> Self {
        Self {
            item: LineItem::new("Article", dec!(1), dec!(100)).with_tax_rate(dec!(19)),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.item.label = label.into();
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.item.quantity = quantity;
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.item.unit_price = unit_price;
        self
    }

    pub fn with_tax_rate(mut self, tax_rate_pct: Decimal) -> Self {
        self.item.tax_rate_pct = tax_rate_pct;
        self
    }

    pub fn with_discount(mut self, discount_pct: Decimal) -> Self {
        self.item.discount_pct = discount_pct;
        self
    }

    pub fn build(self) -> LineItem {
        self.item
    }
}

/// Builder for document snapshots
///
/// Totals are computed when [`SnapshotBuilder::build`] is called.
pub struct SnapshotBuilder {
    doc_type: DocumentType,
    number: String,
    date: NaiveDate,
    client: Option<String>,
    items: Vec<LineItem>,
    extras: Extras,
    withholding: WithholdingRule,
    notes: String,
}

impl SnapshotBuilder {
    /// An empty document of `doc_type` dated 3 May 2024
    pub fn new(doc_type: DocumentType) -> Self {
        Self {
            doc_type,
            number: String::new(),
            date: DateFixtures::may_3(),
            client: None,
            items: Vec::new(),
            extras: Extras::default(),
            withholding: WithholdingRule::default(),
            notes: String::new(),
        }
    }

    /// An invoice numbered `0001`
    pub fn invoice() -> Self {
        Self::new(DocumentType::Invoice).with_number("0001")
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_client(mut self, name: impl Into<String>) -> Self {
        self.client = Some(name.into());
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    pub fn with_withholding(mut self, withholding: WithholdingRule) -> Self {
        self.withholding = withholding;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn build(self) -> DocumentSnapshot {
        let mut snapshot = DocumentSnapshot::new(self.doc_type, self.number, self.date);
        if let Some(name) = self.client {
            snapshot.client = ClientInfo::named(name);
        }
        snapshot.items = self.items;
        snapshot.meta.extras = self.extras;
        snapshot.meta.withholding = self.withholding;
        snapshot.notes = self.notes;
        snapshot.recompute();
        snapshot
    }
}

/// Builder for ledger entries
pub struct LedgerEntryBuilder {
    file_path: String,
    number: u32,
    document_type: DocumentType,
    date: NaiveDate,
    saved_at_epoch_ms: i64,
}

impl Default for LedgerEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerEntryBuilder {
    /// Invoice 0001 dated 3 May 2024
    pub fn new() -> Self {
        Self {
            file_path: "/documents/invoice-0001-2024-05-03.json".to_string(),
            number: 1,
            document_type: DocumentType::Invoice,
            date: DateFixtures::may_3(),
            saved_at_epoch_ms: 1_714_694_400_000,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn with_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn saved_at(mut self, epoch_ms: i64) -> Self {
        self.saved_at_epoch_ms = epoch_ms;
        self
    }

    pub fn build(self) -> LedgerEntry {
        let number = format_number(self.number);
        LedgerEntry::new(
            self.file_path,
            format!("{} {}", self.document_type.label(), number),
            number,
            self.document_type,
            self.date,
        )
        .with_saved_at(self.saved_at_epoch_ms)
    }
}
