//! Billing Domain - Document Totals for the Tunisian Market
//!
//! This crate computes the financial part of commercial documents
//! (invoice, quote, delivery note, purchase order):
//!
//! - **Line items**: quantity × unit price, discount, then TVA
//! - **Extras**: shipping, fiscal stamp (timbre fiscal), FODEC levy
//! - **Withholding**: retenue à la source, above a strict threshold
//! - **Snapshots**: the JSON file format of a saved document
//!
//! # Example
//!
//! ```rust
//! use domain_billing::{DocumentSnapshot, DocumentType, LineItem};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
//! let mut invoice = DocumentSnapshot::new(DocumentType::Invoice, "0001", date);
//! invoice.meta.extras.stamp.enabled = true;
//! invoice.add_item(LineItem::new("Maintenance", dec!(2), dec!(100)).with_tax_rate(dec!(19)));
//!
//! assert_eq!(invoice.totals.total_ht, dec!(200));
//! assert_eq!(invoice.totals.total_ttc, dec!(239));
//! ```

pub mod line_item;
pub mod extras;
pub mod totals;
pub mod document;
pub mod error;

pub use line_item::{LineItem, LineAmounts};
pub use extras::{ExtraCharge, Extras, LevyBasis, ProductionLevy, WithholdingBasis, WithholdingRule};
pub use totals::{TotalsBreakdown, TotalsEngine};
pub use document::{ClientInfo, DocumentMeta, DocumentSnapshot, DocumentType};
pub use error::BillingError;
