//! Core Kernel - Foundational types for the invoicing core
//!
//! This crate provides the building blocks shared by the billing and ledger
//! domains:
//! - Safe coercion of untrusted numeric input into `Decimal`
//! - Month keys used to partition document numbering
//! - Currency labels and percentage rates
//! - The `DocumentStore` port through which all persistence happens

pub mod numeric;
pub mod money;
pub mod temporal;
pub mod ports;

pub use numeric::{to_safe_number, safe_from_f64, to_safe_flag};
pub use money::{Currency, Rate};
pub use temporal::{MonthKey, TemporalError, parse_iso_date};
pub use ports::{DocumentStore, DomainPort, PortError};
