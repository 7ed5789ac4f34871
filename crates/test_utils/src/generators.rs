//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating documents. Amounts stay well
//! inside `Decimal` range so sums never saturate.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_billing::{
    ExtraCharge, Extras, LevyBasis, LineItem, ProductionLevy, WithholdingBasis, WithholdingRule,
};

/// Amounts from 0 to 1 000 000 with millime precision
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 3))
}

/// Percentages from 0 to 100 with two decimals
fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// The TVA rates in use in Tunisia
fn tva_rate_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        Just(Decimal::from(7)),
        Just(Decimal::from(13)),
        Just(Decimal::from(19)),
    ]
}

/// Unit prices with up to 18 significant digits, past what an `f64` holds
pub fn long_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000_000_000_000i64).prop_map(|n| Decimal::new(n, 3))
}

pub fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (
        (0i64..10_000i64).prop_map(|n| Decimal::new(n, 2)),
        amount_strategy(),
        tva_rate_strategy(),
        percentage_strategy(),
    )
        .prop_map(|(quantity, unit_price, tax_rate, discount)| {
            LineItem::new("Article", quantity, unit_price)
                .with_tax_rate(tax_rate)
                .with_discount(discount)
        })
}

fn levy_basis_strategy() -> impl Strategy<Value = LevyBasis> {
    prop_oneof![
        Just(LevyBasis::LinesHt),
        Just(LevyBasis::LinesHtPlusShipping),
        Just(LevyBasis::TtcExcludingLevy),
    ]
}

pub fn extras_strategy() -> impl Strategy<Value = Extras> {
    (
        any::<bool>(),
        amount_strategy(),
        any::<bool>(),
        any::<bool>(),
        percentage_strategy(),
        levy_basis_strategy(),
    )
        .prop_map(|(shipping_on, shipping_ht, stamp_on, fodec_on, fodec_rate, basis)| {
            let mut extras = Extras::default();
            if shipping_on {
                extras.shipping = ExtraCharge::shipping().enabled_with(shipping_ht, Decimal::from(19));
            }
            extras.stamp.enabled = stamp_on;
            extras.fodec = ProductionLevy {
                enabled: fodec_on,
                rate_pct: fodec_rate,
                basis,
                ..ProductionLevy::default()
            };
            extras
        })
}

pub fn withholding_strategy() -> impl Strategy<Value = WithholdingRule> {
    (any::<bool>(), percentage_strategy(), any::<bool>(), amount_strategy()).prop_map(
        |(enabled, rate_pct, on_ht, threshold_amount)| WithholdingRule {
            enabled,
            rate_pct,
            basis: if on_ht { WithholdingBasis::Ht } else { WithholdingBasis::Ttc },
            threshold_amount,
            ..WithholdingRule::default()
        },
    )
}
