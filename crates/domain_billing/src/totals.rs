//! Totals engine
//!
//! Turns line items and document extras into the figures printed at the
//! bottom of a document. The computation is a fixed waterfall:
//!
//! 1. lines (HT and TVA, see [`LineAmounts`])
//! 2. shipping and fiscal stamp, each on its own amount
//! 3. FODEC levy, on a base that may include lines, shipping and stamp
//! 4. totals: the stamp principal is kept out of `total_ht` and only
//!    re-enters at `total_ttc`
//! 5. withholding, on HT or TTC, strictly above a threshold
//!
//! The engine is a pure function. It does not round, does not fail and
//! treats any negative or missing input as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::numeric::{lenient_amount, saturating_add};
use core_kernel::Rate;

use crate::extras::{ExtraCharge, Extras, LevyBasis, WithholdingBasis, WithholdingRule};
use crate::line_item::{LineAmounts, LineItem};

/// Output of the totals engine
///
/// All amounts are non-negative. `net_payable` is `total_ttc` minus the
/// withholding and is not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsBreakdown {
    #[serde(rename = "linesHT", default, with = "lenient_amount")]
    pub lines_ht: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub lines_tax: Decimal,
    #[serde(rename = "shippingHT", default, with = "lenient_amount")]
    pub shipping_ht: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub shipping_tax: Decimal,
    #[serde(rename = "stampHT", default, with = "lenient_amount")]
    pub stamp_ht: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub stamp_tax: Decimal,
    #[serde(rename = "levyHT", default, with = "lenient_amount")]
    pub levy_ht: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub levy_tax: Decimal,
    #[serde(rename = "totalHT", default, with = "lenient_amount")]
    pub total_ht: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub total_tax: Decimal,
    #[serde(rename = "totalTTC", default, with = "lenient_amount")]
    pub total_ttc: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub withholding_amount: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub net_payable: Decimal,
}

impl TotalsBreakdown {
    /// Returns a copy rounded for display, half away from zero
    pub fn rounded(&self, dp: u32) -> Self {
        let r = |d: Decimal| {
            d.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        };
        Self {
            lines_ht: r(self.lines_ht),
            lines_tax: r(self.lines_tax),
            shipping_ht: r(self.shipping_ht),
            shipping_tax: r(self.shipping_tax),
            stamp_ht: r(self.stamp_ht),
            stamp_tax: r(self.stamp_tax),
            levy_ht: r(self.levy_ht),
            levy_tax: r(self.levy_tax),
            total_ht: r(self.total_ht),
            total_tax: r(self.total_tax),
            total_ttc: r(self.total_ttc),
            withholding_amount: r(self.withholding_amount),
            net_payable: r(self.net_payable),
        }
    }

    /// Returns true if the withholding exceeds the TTC
    ///
    /// Not an error for the engine; the form shows it as a warning.
    pub fn is_net_negative(&self) -> bool {
        self.net_payable.is_sign_negative() && !self.net_payable.is_zero()
    }
}

/// HT and TVA of one charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ChargeAmounts {
    ht: Decimal,
    tax: Decimal,
}

impl ChargeAmounts {
    fn of(charge: &ExtraCharge) -> Self {
        if !charge.enabled {
            return Self::default();
        }
        let ht = non_negative(charge.amount_ht);
        Self {
            ht,
            tax: Rate::from_percentage(non_negative(charge.tax_rate_pct)).apply(ht),
        }
    }
}

/// The totals engine
///
/// # Example
///
/// ```rust
/// use domain_billing::{Extras, LineItem, TotalsEngine, WithholdingRule};
/// use rust_decimal_macros::dec;
///
/// let items = vec![LineItem::new("Service", dec!(2), dec!(100)).with_tax_rate(dec!(19))];
/// let totals = TotalsEngine::compute(&items, &Extras::default(), &WithholdingRule::default());
///
/// assert_eq!(totals.total_ttc, dec!(238));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalsEngine;

impl TotalsEngine {
    /// Computes the full breakdown for a document
    pub fn compute(
        items: &[LineItem],
        extras: &Extras,
        withholding: &WithholdingRule,
    ) -> TotalsBreakdown {
        let (lines_ht, lines_tax) = items
            .iter()
            .map(LineAmounts::compute)
            .fold((Decimal::ZERO, Decimal::ZERO), |(ht, tax), line| {
                (saturating_add(ht, line.taxable_base), saturating_add(tax, line.tax))
            });

        let shipping = ChargeAmounts::of(&extras.shipping);
        let stamp = ChargeAmounts::of(&extras.stamp);

        let (levy_ht, levy_tax) = if extras.fodec.enabled {
            let levy_base = match extras.fodec.basis {
                LevyBasis::LinesHt => lines_ht,
                LevyBasis::LinesHtPlusShipping => saturating_add(lines_ht, shipping.ht),
                LevyBasis::TtcExcludingLevy => sum(&[
                    lines_ht,
                    lines_tax,
                    shipping.ht,
                    shipping.tax,
                    stamp.ht,
                    stamp.tax,
                ]),
            };
            let levy_ht = Rate::from_percentage(non_negative(extras.fodec.rate_pct)).apply(levy_base);
            let levy_tax =
                Rate::from_percentage(non_negative(extras.fodec.tax_rate_pct)).apply(levy_ht);
            (levy_ht, levy_tax)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        // Stamp HT stays out of total_ht and is added back only in total_ttc.
        let total_ht = sum(&[lines_ht, shipping.ht, levy_ht]);
        let total_tax = sum(&[lines_tax, shipping.tax, stamp.tax, levy_tax]);
        let total_ttc = sum(&[total_ht, total_tax, stamp.ht]);

        let withholding_amount = Self::withholding(withholding, total_ht, total_ttc);
        let net_payable = total_ttc - withholding_amount;

        TotalsBreakdown {
            lines_ht,
            lines_tax,
            shipping_ht: shipping.ht,
            shipping_tax: shipping.tax,
            stamp_ht: stamp.ht,
            stamp_tax: stamp.tax,
            levy_ht,
            levy_tax,
            total_ht,
            total_tax,
            total_ttc,
            withholding_amount,
            net_payable,
        }
    }

    /// Withholding on HT (stamp excluded) or TTC (stamp included)
    fn withholding(rule: &WithholdingRule, total_ht: Decimal, total_ttc: Decimal) -> Decimal {
        if !rule.enabled {
            return Decimal::ZERO;
        }
        let base = match rule.basis {
            WithholdingBasis::Ttc => total_ttc,
            WithholdingBasis::Ht => total_ht,
        };
        if base > non_negative(rule.threshold_amount) {
            Rate::from_percentage(non_negative(rule.rate_pct)).apply(base)
        } else {
            Decimal::ZERO
        }
    }
}

fn non_negative(d: Decimal) -> Decimal {
    if d.is_sign_negative() {
        Decimal::ZERO
    } else {
        d
    }
}

fn sum(values: &[Decimal]) -> Decimal {
    values.iter().fold(Decimal::ZERO, |acc, v| saturating_add(acc, *v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn two_hundred_ht() -> Vec<LineItem> {
        vec![LineItem::new("Prestation", dec!(2), dec!(100)).with_tax_rate(dec!(19))]
    }

    #[test]
    fn test_stamp_only_reaches_ttc() {
        let extras = Extras {
            stamp: ExtraCharge::fiscal_stamp().enabled_with(dec!(1), dec!(0)),
            ..Extras::default()
        };

        let totals = TotalsEngine::compute(&two_hundred_ht(), &extras, &WithholdingRule::default());

        assert_eq!(totals.lines_ht, dec!(200));
        assert_eq!(totals.lines_tax, dec!(38));
        assert_eq!(totals.total_ht, dec!(200));
        assert_eq!(totals.total_tax, dec!(38));
        assert_eq!(totals.total_ttc, dec!(239));
        assert_eq!(totals.net_payable, dec!(239));
    }

    #[test]
    fn test_levy_on_lines_plus_shipping() {
        let extras = Extras {
            shipping: ExtraCharge::shipping().enabled_with(dec!(10), dec!(19)),
            fodec: ProductionLevyFixture::on(LevyBasis::LinesHtPlusShipping),
            ..Extras::default()
        };

        let totals = TotalsEngine::compute(&two_hundred_ht(), &extras, &WithholdingRule::default());

        assert_eq!(totals.levy_ht, dec!(2.10));
        assert_eq!(totals.levy_tax, dec!(0.399));
        assert_eq!(totals.total_ht, dec!(212.10));
        assert_eq!(totals.total_tax, dec!(40.299));
        assert_eq!(totals.total_ttc, dec!(252.399));
    }

    #[test]
    fn test_levy_on_ttc_includes_stamp() {
        let extras = Extras {
            stamp: ExtraCharge::fiscal_stamp().enabled_with(dec!(1), dec!(0)),
            fodec: ProductionLevyFixture::on(LevyBasis::TtcExcludingLevy),
            ..Extras::default()
        };

        let totals = TotalsEngine::compute(&two_hundred_ht(), &extras, &WithholdingRule::default());

        // base = 200 + 38 + 1
        assert_eq!(totals.levy_ht, dec!(2.39));
    }

    #[test]
    fn test_disabled_levy_contributes_nothing() {
        let totals = TotalsEngine::compute(
            &two_hundred_ht(),
            &Extras::default(),
            &WithholdingRule::default(),
        );
        assert_eq!(totals.levy_ht, Decimal::ZERO);
        assert_eq!(totals.levy_tax, Decimal::ZERO);
    }

    #[test]
    fn test_withholding_threshold_is_strict() {
        let items = vec![LineItem::new("Lot", dec!(1), dec!(1000))];
        let rule = WithholdingRule {
            enabled: true,
            basis: WithholdingBasis::Ht,
            ..WithholdingRule::default()
        };

        let at_threshold = TotalsEngine::compute(&items, &Extras::default(), &rule);
        assert_eq!(at_threshold.withholding_amount, Decimal::ZERO);

        let items = vec![LineItem::new("Lot", dec!(1), dec!(1000.01))];
        let above = TotalsEngine::compute(&items, &Extras::default(), &rule);
        assert_eq!(above.withholding_amount, dec!(10.0001));
        assert_eq!(above.net_payable, dec!(990.0099));
    }

    #[test]
    fn test_withholding_on_ttc_includes_stamp() {
        let items = vec![LineItem::new("Lot", dec!(1), dec!(999))];
        let extras = Extras {
            stamp: ExtraCharge::fiscal_stamp().enabled_with(dec!(1), dec!(0)),
            ..Extras::default()
        };
        let ttc_rule = WithholdingRule { enabled: true, ..WithholdingRule::default() };
        let ht_rule = WithholdingRule {
            enabled: true,
            basis: WithholdingBasis::Ht,
            threshold_amount: dec!(999),
            ..WithholdingRule::default()
        };

        // TTC = 1000, not strictly above 1000
        assert_eq!(
            TotalsEngine::compute(&items, &extras, &ttc_rule).withholding_amount,
            Decimal::ZERO
        );
        // HT = 999 excludes the stamp, not strictly above 999
        assert_eq!(
            TotalsEngine::compute(&items, &extras, &ht_rule).withholding_amount,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_net_payable_is_not_clamped() {
        let items = vec![LineItem::new("Lot", dec!(1), dec!(100))];
        let rule = WithholdingRule {
            enabled: true,
            rate_pct: dec!(150),
            threshold_amount: Decimal::ZERO,
            ..WithholdingRule::default()
        };

        let totals = TotalsEngine::compute(&items, &Extras::default(), &rule);
        assert_eq!(totals.net_payable, dec!(-50));
        assert!(totals.is_net_negative());
    }

    #[test]
    fn test_rounded_for_display() {
        let totals = TotalsBreakdown {
            levy_tax: dec!(0.3995),
            ..TotalsBreakdown::default()
        };
        assert_eq!(totals.rounded(3).levy_tax, dec!(0.400));
    }

    struct ProductionLevyFixture;

    impl ProductionLevyFixture {
        fn on(basis: LevyBasis) -> crate::extras::ProductionLevy {
            crate::extras::ProductionLevy {
                enabled: true,
                rate_pct: dec!(1),
                basis,
                tax_rate_pct: dec!(19),
                ..Default::default()
            }
        }
    }
}
