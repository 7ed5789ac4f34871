//! Custom Test Assertions
//!
//! Provides an assertion helper for totals that gives more meaningful error
//! messages than standard assertions.

use rust_decimal::Decimal;

use domain_billing::TotalsBreakdown;

/// Asserts the structural relations every breakdown must satisfy
///
/// - total HT is lines + shipping + levy, stamp excluded
/// - total tax is the sum of the four tax components
/// - TTC is total HT + total tax + stamp HT
/// - net payable is TTC minus withholding
/// - no component is negative
pub fn assert_breakdown_consistent(totals: &TotalsBreakdown) {
    let components = [
        ("linesHT", totals.lines_ht),
        ("linesTax", totals.lines_tax),
        ("shippingHT", totals.shipping_ht),
        ("shippingTax", totals.shipping_tax),
        ("stampHT", totals.stamp_ht),
        ("stampTax", totals.stamp_tax),
        ("levyHT", totals.levy_ht),
        ("levyTax", totals.levy_tax),
        ("withholdingAmount", totals.withholding_amount),
    ];
    for (name, value) in components {
        assert!(value >= Decimal::ZERO, "{} is negative: {}", name, value);
    }

    assert_eq!(
        totals.total_ht,
        totals.lines_ht + totals.shipping_ht + totals.levy_ht,
        "totalHT must exclude the stamp: {:?}",
        totals
    );
    assert_eq!(
        totals.total_tax,
        totals.lines_tax + totals.shipping_tax + totals.stamp_tax + totals.levy_tax,
        "totalTax must sum every tax component: {:?}",
        totals
    );
    assert_eq!(
        totals.total_ttc,
        totals.total_ht + totals.total_tax + totals.stamp_ht,
        "totalTTC must be totalHT + totalTax + stampHT: {:?}",
        totals
    );
    assert_eq!(
        totals.net_payable,
        totals.total_ttc - totals.withholding_amount,
        "netPayable must be totalTTC - withholding: {:?}",
        totals
    );
}
