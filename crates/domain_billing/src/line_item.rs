//! Line items and per-line math
//!
//! A line contributes a taxable base and a tax amount to the document
//! totals. The order of the steps is fixed: gross amount, discount, clamp,
//! then tax on the clamped base.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::numeric::{lenient_amount, lenient_opt_text, lenient_text, saturating_mul};
use core_kernel::Rate;

/// A line item on a commercial document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Article reference (SKU)
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub reference: Option<String>,
    /// Designation shown on the document
    #[serde(default, with = "lenient_text")]
    pub label: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_opt_text")]
    pub description: Option<String>,
    /// Quantity
    #[serde(default, with = "lenient_amount")]
    pub quantity: Decimal,
    /// Unit price, excluding tax
    #[serde(default, with = "lenient_amount")]
    pub unit_price: Decimal,
    /// TVA rate in percent
    #[serde(default, with = "lenient_amount")]
    pub tax_rate_pct: Decimal,
    /// Discount in percent, 0 to 100
    #[serde(default, with = "lenient_amount")]
    pub discount_pct: Decimal,
}

impl LineItem {
    /// Creates a line with a quantity and a unit price, no tax, no discount
    pub fn new(label: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            label: label.into(),
            quantity,
            unit_price,
            ..Default::default()
        }
    }

    /// Sets the TVA rate
    pub fn with_tax_rate(mut self, tax_rate_pct: Decimal) -> Self {
        self.tax_rate_pct = tax_rate_pct;
        self
    }

    /// Sets the discount
    pub fn with_discount(mut self, discount_pct: Decimal) -> Self {
        self.discount_pct = discount_pct;
        self
    }

    /// Sets the article reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Returns a copy whose numbers are safe to compute with
    ///
    /// Negative values become zero and the discount is capped at 100%.
    /// Fields built through serde are already non-negative; this also covers
    /// lines assembled in code.
    pub fn normalized(&self) -> Self {
        let non_negative = |d: Decimal| if d.is_sign_negative() { Decimal::ZERO } else { d };
        Self {
            quantity: non_negative(self.quantity),
            unit_price: non_negative(self.unit_price),
            tax_rate_pct: non_negative(self.tax_rate_pct),
            discount_pct: non_negative(self.discount_pct).min(dec!(100)),
            ..self.clone()
        }
    }

    /// Computes this line's amounts
    pub fn amounts(&self) -> LineAmounts {
        LineAmounts::compute(self)
    }
}

/// The amounts one line contributes to the totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// quantity × unit price
    pub gross: Decimal,
    /// gross × discount %
    pub discount: Decimal,
    /// gross − discount, never below zero
    pub taxable_base: Decimal,
    /// taxable base × TVA %
    pub tax: Decimal,
}

impl LineAmounts {
    /// Runs the per-line steps on a normalized copy of `item`
    pub fn compute(item: &LineItem) -> Self {
        let item = item.normalized();

        let gross = saturating_mul(item.quantity, item.unit_price);
        let discount = Rate::from_percentage(item.discount_pct).apply(gross);
        let taxable_base = (gross - discount).max(Decimal::ZERO);
        let tax = Rate::from_percentage(item.tax_rate_pct).apply(taxable_base);

        Self {
            gross,
            discount,
            taxable_base,
            tax,
        }
    }
}
