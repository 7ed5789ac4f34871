//! Pre-built Test Fixtures
//!
//! Ready-to-use dates, extras configurations and documents. Amounts follow
//! the worked examples used across the test suite: two lines at 100 DT with
//! 19% TVA, and the 1.000 DT fiscal stamp.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::ports::mock::InMemoryDocumentStore;
use domain_billing::{
    DocumentSnapshot, DocumentType, ExtraCharge, Extras, LevyBasis, LineItem, ProductionLevy,
    WithholdingBasis, WithholdingRule,
};
use domain_ledger::LedgerService;

use crate::builders::SnapshotBuilder;

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// 3 May 2024, month key 202405
    pub fn may_3() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    /// Day `day` of May 2024
    pub fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    /// 1 June 2024, the month after [`DateFixtures::may_3`]
    pub fn june_1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }
}

/// Fixture for document extras
pub struct ExtrasFixtures;

impl ExtrasFixtures {
    /// Only the fiscal stamp, 1.000 DT untaxed
    pub fn stamp_only() -> Extras {
        Extras {
            stamp: ExtraCharge::fiscal_stamp().enabled_with(dec!(1), dec!(0)),
            ..Extras::default()
        }
    }

    /// Shipping 10 DT at 19%, stamp, FODEC 1% on lines + shipping
    pub fn full() -> Extras {
        Extras {
            shipping: ExtraCharge::shipping().enabled_with(dec!(10), dec!(19)),
            stamp: ExtraCharge::fiscal_stamp().enabled_with(dec!(1), dec!(0)),
            fodec: ProductionLevy {
                enabled: true,
                rate_pct: dec!(1),
                basis: LevyBasis::LinesHtPlusShipping,
                tax_rate_pct: dec!(19),
                ..ProductionLevy::default()
            },
        }
    }

    /// Withholding of 1.5% on TTC above 1000 DT
    pub fn withholding_ttc() -> WithholdingRule {
        WithholdingRule {
            enabled: true,
            rate_pct: dec!(1.5),
            basis: WithholdingBasis::Ttc,
            threshold_amount: dec!(1000),
            ..WithholdingRule::default()
        }
    }
}

/// Fixture for line items and documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// Two units at 100 DT, 19% TVA
    pub fn service_line() -> LineItem {
        LineItem::new("Prestation", dec!(2), dec!(100)).with_tax_rate(dec!(19))
    }

    /// Invoice `number` dated 3 May 2024 for client Sotupa, stamp enabled
    pub fn invoice(number: &str) -> DocumentSnapshot {
        SnapshotBuilder::invoice()
            .with_number(number)
            .with_client("Sotupa")
            .with_item(Self::service_line())
            .with_extras(ExtrasFixtures::stamp_only())
            .build()
    }

    /// A quote dated 3 May 2024
    pub fn quote() -> DocumentSnapshot {
        SnapshotBuilder::new(DocumentType::Quote)
            .with_client("Sotupa")
            .with_item(Self::service_line())
            .build()
    }
}

/// Fixture for stores and ledger services
pub struct StoreFixtures;

impl StoreFixtures {
    /// State file used by the in-memory fixtures
    pub const LEDGER_PATH: &'static str = "/documents/ledger.json";

    /// Documents directory used by the in-memory fixtures
    pub const DOCUMENTS_DIR: &'static str = "/documents";

    /// An empty store and a ledger service loaded from it
    pub async fn empty_ledger() -> (Arc<InMemoryDocumentStore>, Arc<LedgerService>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let ledger = LedgerService::load(store.clone(), Self::LEDGER_PATH).await;
        (store, Arc::new(ledger))
    }
}
