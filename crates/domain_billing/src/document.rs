//! Document snapshots
//!
//! A snapshot is everything needed to redisplay or re-export a document:
//! client block, metadata (type, number, date, extras, withholding), notes,
//! line items and the last computed totals. It is stored as one JSON file.
//!
//! Persisted totals are kept for display convenience only. Loading a
//! snapshot always recomputes them from the items and extras.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use core_kernel::numeric::{lenient_block, lenient_opt_text, lenient_text};
use core_kernel::{parse_iso_date, Currency, MonthKey};

use crate::error::BillingError;
use crate::extras::{Extras, WithholdingRule};
use crate::line_item::LineItem;
use crate::totals::{TotalsBreakdown, TotalsEngine};

/// Kind of commercial document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    #[serde(alias = "facture")]
    Invoice,
    #[serde(alias = "devis")]
    Quote,
    #[serde(alias = "bon-livraison")]
    DeliveryNote,
    #[serde(alias = "bon-commande")]
    PurchaseOrder,
}

impl DocumentType {
    /// Only invoices get sequential numbers from the ledger
    pub fn is_auto_numbered(&self) -> bool {
        matches!(self, DocumentType::Invoice)
    }

    /// Title printed on the document
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Facture",
            DocumentType::Quote => "Devis",
            DocumentType::DeliveryNote => "Bon de livraison",
            DocumentType::PurchaseOrder => "Bon de commande",
        }
    }

    /// Short identifier used in file names and the ledger file
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Quote => "quote",
            DocumentType::DeliveryNote => "delivery-note",
            DocumentType::PurchaseOrder => "purchase-order",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Client block of a document
///
/// Client records are managed elsewhere; the document keeps a copy of the
/// fields it prints. Keys this type does not know are carried through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub address: Option<String>,
    /// Matricule fiscal
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub vat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ClientInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub doc_type: DocumentType,
    #[serde(default, with = "lenient_text")]
    pub number: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_block")]
    pub currency: Currency,
    #[serde(default, deserialize_with = "lenient_block")]
    pub withholding: WithholdingRule,
    #[serde(default, deserialize_with = "lenient_block")]
    pub extras: Extras,
}

/// A complete document as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default, deserialize_with = "lenient_block")]
    pub client: ClientInfo,
    pub meta: DocumentMeta,
    #[serde(default, with = "lenient_text")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient_block")]
    pub totals: TotalsBreakdown,
}

impl DocumentSnapshot {
    /// Creates an empty document with default extras
    pub fn new(doc_type: DocumentType, number: impl Into<String>, date: NaiveDate) -> Self {
        let mut snapshot = Self {
            client: ClientInfo::default(),
            meta: DocumentMeta {
                doc_type,
                number: number.into(),
                date,
                currency: Currency::default(),
                withholding: WithholdingRule::default(),
                extras: Extras::default(),
            },
            notes: String::new(),
            items: Vec::new(),
            totals: TotalsBreakdown::default(),
        };
        snapshot.recompute();
        snapshot
    }

    /// Parses a stored document and recomputes its totals
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidDocument` if the value is not a document
    /// (missing `meta`, unknown document type, unparseable date). Malformed
    /// numbers, text and optional blocks inside a valid document get their
    /// defaults, never rejected.
    pub fn from_json(value: Value) -> Result<Self, BillingError> {
        let mut snapshot: DocumentSnapshot = serde_json::from_value(value)
            .map_err(|e| BillingError::InvalidDocument(e.to_string()))?;
        snapshot.recompute();
        Ok(snapshot)
    }

    /// Serializes the document, totals included
    pub fn to_json(&self) -> Result<Value, BillingError> {
        serde_json::to_value(self).map_err(|e| BillingError::Serialization(e.to_string()))
    }

    /// Refreshes `totals` from the items and extras
    pub fn recompute(&mut self) -> &TotalsBreakdown {
        self.totals = TotalsEngine::compute(&self.items, &self.meta.extras, &self.meta.withholding);
        &self.totals
    }

    /// Appends a line and refreshes the totals
    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.recompute();
    }

    pub fn doc_type(&self) -> DocumentType {
        self.meta.doc_type
    }

    pub fn number(&self) -> &str {
        &self.meta.number
    }

    pub fn date(&self) -> NaiveDate {
        self.meta.date
    }

    /// The numbering period this document belongs to
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.meta.date)
    }

    /// Name shown in the recent documents list, e.g. `Facture 0003 - Sotupa`
    pub fn display_name(&self) -> String {
        let mut name = self.meta.doc_type.label().to_string();
        let number = self.meta.number.trim();
        if !number.is_empty() {
            name.push(' ');
            name.push_str(number);
        }
        if let Some(client) = self.client.name.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            name.push_str(" - ");
            name.push_str(client);
        }
        name
    }
}

/// Items that are not line objects are dropped instead of failing the
/// whole document
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<LineItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable line item");
                None
            }
        })
        .collect())
}

mod iso_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn may_3() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    #[test]
    fn test_display_name() {
        let mut snapshot = DocumentSnapshot::new(DocumentType::Invoice, "0003", may_3());
        assert_eq!(snapshot.display_name(), "Facture 0003");

        snapshot.client = ClientInfo::named("Sotupa");
        assert_eq!(snapshot.display_name(), "Facture 0003 - Sotupa");

        let quote = DocumentSnapshot::new(DocumentType::Quote, "", may_3());
        assert_eq!(quote.display_name(), "Devis");
    }

    #[test]
    fn test_only_invoices_are_numbered() {
        assert!(DocumentType::Invoice.is_auto_numbered());
        assert!(!DocumentType::Quote.is_auto_numbered());
        assert!(!DocumentType::DeliveryNote.is_auto_numbered());
        assert!(!DocumentType::PurchaseOrder.is_auto_numbered());
    }

    #[test]
    fn test_persisted_totals_are_not_trusted() {
        let value = json!({
            "meta": {"docType": "invoice", "number": "0001", "date": "2024-05-03"},
            "items": [{"label": "A", "quantity": 1, "unitPrice": 50, "taxRatePct": 19}],
            "totals": {"totalTTC": 9999}
        });

        let snapshot = DocumentSnapshot::from_json(value).unwrap();
        assert_eq!(snapshot.totals.total_ttc, dec!(59.5));
    }

    #[test]
    fn test_unreadable_items_are_dropped() {
        let value = json!({
            "meta": {"docType": "quote", "date": "2024-05-03"},
            "items": [null, {"label": "B", "quantity": 2, "unitPrice": 10}, 42]
        });

        let snapshot = DocumentSnapshot::from_json(value).unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.totals.lines_ht, dec!(20));
    }

    #[test]
    fn test_missing_meta_is_an_error() {
        let result = DocumentSnapshot::from_json(json!({"items": []}));
        assert!(matches!(result, Err(BillingError::InvalidDocument(_))));
    }

    #[test]
    fn test_unknown_client_keys_survive() {
        let value = json!({
            "client": {"name": "Sotupa", "fax": "71 000 000"},
            "meta": {"docType": "delivery-note", "date": "2024-05-03"}
        });

        let snapshot = DocumentSnapshot::from_json(value).unwrap();
        let back = snapshot.to_json().unwrap();
        assert_eq!(back["client"]["fax"], json!("71 000 000"));
        assert_eq!(back["meta"]["docType"], json!("delivery-note"));
        assert_eq!(back["meta"]["date"], json!("2024-05-03"));
    }

    #[test]
    fn test_null_text_keeps_the_line_in_the_totals() {
        let value = json!({
            "meta": {"docType": "invoice", "number": 7, "date": "2024-05-03"},
            "items": [{"label": null, "quantity": 2, "unitPrice": 100, "taxRatePct": 19}]
        });

        let snapshot = DocumentSnapshot::from_json(value).unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.totals.lines_ht, dec!(200));
        assert_eq!(snapshot.number(), "7");
    }

    #[test]
    fn test_null_or_malformed_blocks_get_defaults() {
        let value = json!({
            "client": null,
            "notes": null,
            "meta": {
                "docType": "invoice",
                "date": "2024-05-03",
                "currency": "XYZ",
                "withholding": null,
                "extras": {"shipping": null, "stamp": 12, "fodec": "none"}
            },
            "items": [{"label": "A", "quantity": 1, "unitPrice": 50}],
            "totals": "stale"
        });

        let snapshot = DocumentSnapshot::from_json(value).unwrap();
        assert_eq!(snapshot.client, ClientInfo::default());
        assert_eq!(snapshot.notes, "");
        assert_eq!(snapshot.meta.currency, Currency::TND);
        assert_eq!(snapshot.meta.withholding, WithholdingRule::default());
        assert_eq!(snapshot.meta.extras, Extras::default());
        assert_eq!(snapshot.totals.lines_ht, dec!(50));
    }

    #[test]
    fn test_wrong_typed_client_fields_are_coerced() {
        let value = json!({
            "client": {"name": "Sotupa", "phone": 71000000, "email": null},
            "meta": {"docType": "quote", "date": "2024-05-03"}
        });

        let snapshot = DocumentSnapshot::from_json(value).unwrap();
        assert_eq!(snapshot.client.name.as_deref(), Some("Sotupa"));
        assert_eq!(snapshot.client.phone.as_deref(), Some("71000000"));
        assert_eq!(snapshot.client.email, None);
    }
}
