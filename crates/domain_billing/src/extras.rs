//! Document-level charges and deductions
//!
//! Besides its lines, a Tunisian commercial document may carry:
//! - a shipping charge, taxable like a line
//! - the fiscal stamp (timbre fiscal), a fixed duty added only to the TTC
//! - the FODEC production levy, computed on a configurable base
//! - a withholding tax (retenue à la source) deducted from the payable amount
//!
//! Every block is optional in stored documents. Defaults are applied once,
//! while deserializing, so the engine never has to check for absent blocks.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use core_kernel::numeric::{block_or, lenient_amount, lenient_block, lenient_flag, lenient_text};

/// A flat charge with its own TVA rate (shipping, fiscal stamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraCharge {
    #[serde(default, with = "lenient_flag")]
    pub enabled: bool,
    #[serde(default, with = "lenient_text")]
    pub label: String,
    #[serde(rename = "amountHT", default, with = "lenient_amount")]
    pub amount_ht: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub tax_rate_pct: Decimal,
}

impl ExtraCharge {
    /// Default shipping block: disabled, 19% TVA
    pub fn shipping() -> Self {
        Self {
            enabled: false,
            label: "Frais de transport".to_string(),
            amount_ht: Decimal::ZERO,
            tax_rate_pct: dec!(19),
        }
    }

    /// Default fiscal stamp block: disabled, 1.000 DT, not subject to TVA
    pub fn fiscal_stamp() -> Self {
        Self {
            enabled: false,
            label: "Timbre fiscal".to_string(),
            amount_ht: dec!(1.000),
            tax_rate_pct: Decimal::ZERO,
        }
    }

    /// Enables the charge with the given amount
    pub fn enabled_with(mut self, amount_ht: Decimal, tax_rate_pct: Decimal) -> Self {
        self.enabled = true;
        self.amount_ht = amount_ht;
        self.tax_rate_pct = tax_rate_pct;
        self
    }
}

/// Which running subtotal the FODEC levy is computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevyBasis {
    /// Lines HT only
    #[default]
    LinesHt,
    /// Lines HT plus shipping HT
    LinesHtPlusShipping,
    /// The full TTC the document would have without the levy, stamp included
    TtcExcludingLevy,
}

impl LevyBasis {
    /// Wire value stored in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            LevyBasis::LinesHt => "ht",
            LevyBasis::LinesHtPlusShipping => "ht_plus",
            LevyBasis::TtcExcludingLevy => "ttc",
        }
    }

    /// Parses a stored value; unknown values fall back to lines HT
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ht_plus" | "ht-plus" | "lines-ht-plus-shipping" => LevyBasis::LinesHtPlusShipping,
            "ttc" | "ttc-excluding-levy" => LevyBasis::TtcExcludingLevy,
            _ => LevyBasis::LinesHt,
        }
    }
}

impl Serialize for LevyBasis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LevyBasis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(LevyBasis::parse).unwrap_or_default())
    }
}

/// The FODEC production levy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionLevy {
    #[serde(default, with = "lenient_flag")]
    pub enabled: bool,
    #[serde(default, with = "lenient_text")]
    pub label: String,
    #[serde(default, with = "lenient_amount")]
    pub rate_pct: Decimal,
    #[serde(default)]
    pub basis: LevyBasis,
    #[serde(default, with = "lenient_amount")]
    pub tax_rate_pct: Decimal,
}

impl Default for ProductionLevy {
    fn default() -> Self {
        Self {
            enabled: false,
            label: "FODEC".to_string(),
            rate_pct: dec!(1),
            basis: LevyBasis::LinesHt,
            tax_rate_pct: dec!(19),
        }
    }
}

/// The optional extras of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    #[serde(default = "ExtraCharge::shipping", deserialize_with = "shipping_or_default")]
    pub shipping: ExtraCharge,
    #[serde(default = "ExtraCharge::fiscal_stamp", deserialize_with = "stamp_or_default")]
    pub stamp: ExtraCharge,
    #[serde(default, deserialize_with = "lenient_block")]
    pub fodec: ProductionLevy,
}

fn shipping_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExtraCharge, D::Error> {
    Ok(block_or(Value::deserialize(deserializer)?, ExtraCharge::shipping))
}

fn stamp_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExtraCharge, D::Error> {
    Ok(block_or(Value::deserialize(deserializer)?, ExtraCharge::fiscal_stamp))
}

impl Default for Extras {
    fn default() -> Self {
        Self {
            shipping: ExtraCharge::shipping(),
            stamp: ExtraCharge::fiscal_stamp(),
            fodec: ProductionLevy::default(),
        }
    }
}

/// Which amount the withholding rate applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WithholdingBasis {
    /// Lines HT + shipping HT + levy HT, stamp excluded
    Ht,
    /// The final TTC, stamp included
    #[default]
    Ttc,
}

impl WithholdingBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithholdingBasis::Ht => "HT",
            WithholdingBasis::Ttc => "TTC",
        }
    }

    /// Parses a stored value, case-insensitively; unknown values mean TTC
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("ht") {
            WithholdingBasis::Ht
        } else {
            WithholdingBasis::Ttc
        }
    }
}

impl Serialize for WithholdingBasis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WithholdingBasis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(WithholdingBasis::parse).unwrap_or_default())
    }
}

/// Withholding tax (retenue à la source)
///
/// Applied only when the chosen basis is strictly greater than the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithholdingRule {
    #[serde(default, with = "lenient_flag")]
    pub enabled: bool,
    #[serde(default, with = "lenient_amount")]
    pub rate_pct: Decimal,
    #[serde(default)]
    pub basis: WithholdingBasis,
    #[serde(default, with = "lenient_amount")]
    pub threshold_amount: Decimal,
    #[serde(default, with = "lenient_text")]
    pub label: String,
}

impl Default for WithholdingRule {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_pct: dec!(1),
            basis: WithholdingBasis::Ttc,
            threshold_amount: dec!(1000),
            label: "Retenue à la source".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_blocks_get_defaults() {
        let extras: Extras = serde_json::from_value(json!({})).unwrap();
        assert_eq!(extras, Extras::default());
        assert!(!extras.stamp.enabled);
        assert_eq!(extras.stamp.amount_ht, dec!(1));
    }

    #[test]
    fn test_levy_basis_wire_values() {
        let levy: ProductionLevy =
            serde_json::from_value(json!({"enabled": true, "ratePct": 1, "basis": "ht_plus"})).unwrap();
        assert_eq!(levy.basis, LevyBasis::LinesHtPlusShipping);

        assert_eq!(LevyBasis::parse("ttc-excluding-levy"), LevyBasis::TtcExcludingLevy);
        assert_eq!(LevyBasis::parse("lines-HT"), LevyBasis::LinesHt);
        assert_eq!(LevyBasis::parse("whatever"), LevyBasis::LinesHt);
    }

    #[test]
    fn test_levy_basis_non_string_falls_back() {
        let levy: ProductionLevy = serde_json::from_value(json!({"basis": 3})).unwrap();
        assert_eq!(levy.basis, LevyBasis::LinesHt);
    }

    #[test]
    fn test_withholding_basis_is_case_insensitive() {
        let rule: WithholdingRule =
            serde_json::from_value(json!({"enabled": true, "basis": "ht"})).unwrap();
        assert_eq!(rule.basis, WithholdingBasis::Ht);
        assert_eq!(WithholdingBasis::parse("Ttc"), WithholdingBasis::Ttc);
    }

    #[test]
    fn test_charge_serializes_amount_ht_key() {
        let value = serde_json::to_value(ExtraCharge::fiscal_stamp()).unwrap();
        assert_eq!(value["amountHT"], json!(1.0));
        assert_eq!(value["taxRatePct"], json!(0.0));
    }

    #[test]
    fn test_null_blocks_get_defaults() {
        let extras: Extras =
            serde_json::from_value(json!({"shipping": null, "stamp": "oui", "fodec": null})).unwrap();
        assert_eq!(extras, Extras::default());
    }

    #[test]
    fn test_wrong_typed_label_becomes_empty() {
        let charge: ExtraCharge =
            serde_json::from_value(json!({"enabled": true, "label": {"fr": "Port"}, "amountHT": 7})).unwrap();
        assert_eq!(charge.label, "");
        assert_eq!(charge.amount_ht, dec!(7));

        let levy: ProductionLevy = serde_json::from_value(json!({"label": false})).unwrap();
        assert_eq!(levy.label, "");
    }
}
