//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! invoicing core test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built dates, extras, documents and seeded stores
//! - `builders`: Builder patterns for line items, snapshots and ledger entries
//! - `assertions`: Custom assertion helpers for totals
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
