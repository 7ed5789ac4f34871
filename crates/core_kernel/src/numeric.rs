//! Safe number coercion
//!
//! Every numeric value that enters the invoicing core from the outside
//! (a form field, a JSON document written by an older version, a partially
//! typed number) goes through [`to_safe_number`]. The coercion never fails:
//! anything that is not a finite, non-negative number becomes the supplied
//! default. Code past this boundary works on clean `Decimal` values only.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Coerces an arbitrary JSON value into a non-negative decimal
///
/// Accepted inputs are JSON numbers and numeric strings. Strings may carry
/// surrounding or grouping whitespace, a comma as decimal separator, or
/// scientific notation. Everything else (null, booleans, arrays, objects,
/// garbage strings, negative values) yields `default`.
///
/// # Example
///
/// ```rust
/// use core_kernel::numeric::to_safe_number;
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// assert_eq!(to_safe_number(&json!("12,5"), Decimal::ZERO), Decimal::new(125, 1));
/// assert_eq!(to_safe_number(&json!(-3), Decimal::ZERO), Decimal::ZERO);
/// assert_eq!(to_safe_number(&json!(null), Decimal::ONE), Decimal::ONE);
/// ```
pub fn to_safe_number(value: &Value, default: Decimal) -> Decimal {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };

    match parsed {
        Some(d) if !d.is_sign_negative() => d.normalize(),
        Some(d) if d.is_zero() => Decimal::ZERO,
        _ => default,
    }
}

/// Coerces a float coming from a UI widget
///
/// NaN, infinities and negative values yield `default`.
pub fn safe_from_f64(value: f64, default: Decimal) -> Decimal {
    if !value.is_finite() || value < 0.0 {
        return default;
    }
    Decimal::from_f64(value).unwrap_or(default)
}

/// Coerces a JSON value into a flag
///
/// Booleans are taken as-is; `1`, `"true"`, `"yes"`, `"on"` and `"1"` are
/// true. Anything else is false.
pub fn to_safe_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        _ => false,
    }
}

/// Addition that saturates at `Decimal::MAX` instead of panicking
pub fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::MAX)
}

/// Multiplication that saturates at `Decimal::MAX` instead of panicking
///
/// Only meant for non-negative operands.
pub fn saturating_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::MAX)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

/// serde adapter for amounts and percentages
///
/// Deserializes through [`to_safe_number`] with a zero default, so a field
/// holding `"abc"` or `-5` loads as zero instead of failing the whole
/// document. Serializes as a plain JSON number when an `f64` holds the value
/// exactly, otherwise as a decimal string, which reads back unchanged.
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(default, with = "core_kernel::numeric::lenient_amount")]
///     quantity: Decimal,
/// }
/// ```
pub mod lenient_amount {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = value.normalize().to_string();
        if significant_digits(value) <= F64_EXACT_DIGITS {
            if let Ok(f) = text.parse::<f64>() {
                return serializer.serialize_f64(f);
            }
        }
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(to_safe_number(&value, Decimal::ZERO))
    }
}

/// serde adapter for on/off switches, see [`to_safe_flag`]
pub mod lenient_flag {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(to_safe_flag(&value))
    }
}

/// Decimal digits an `f64` always round-trips through its shortest form
const F64_EXACT_DIGITS: u32 = 15;

fn significant_digits(value: &Decimal) -> u32 {
    let mut mantissa = value.normalize().mantissa().unsigned_abs();
    let mut digits = 1;
    while mantissa >= 10 {
        mantissa /= 10;
        digits += 1;
    }
    digits
}

/// Coerces a JSON value into text
///
/// Strings are kept and numbers become their JSON text. Anything else yields
/// an empty string.
pub fn to_safe_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// serde adapter for labels and other free text, see [`to_safe_text`]
pub mod lenient_text {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(to_safe_text(&value))
    }
}

/// serde adapter for optional text; empty or unusable values become `None`
pub mod lenient_opt_text {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(text) => serializer.serialize_some(text),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Some(to_safe_text(&value)).filter(|text| !text.is_empty()))
    }
}

/// Reads a nested block, falling back to `fallback()` when the value is null
/// or not shaped like the block
pub fn block_or<T, F>(value: Value, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    if value.is_null() {
        return fallback();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Unreadable block replaced by its default");
        fallback()
    })
}

/// `deserialize_with` helper for blocks that have a `Default`
///
/// ```rust,ignore
/// #[serde(default, deserialize_with = "core_kernel::numeric::lenient_block")]
/// withholding: WithholdingRule,
/// ```
pub fn lenient_block<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(block_or(value, T::default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(to_safe_number(&json!(19), Decimal::ZERO), dec!(19));
        assert_eq!(to_safe_number(&json!(0.1), Decimal::ZERO), dec!(0.1));
    }

    #[test]
    fn test_partially_typed_strings() {
        assert_eq!(to_safe_number(&json!(" 1 250,75 "), Decimal::ZERO), dec!(1250.75));
        assert_eq!(to_safe_number(&json!("-"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(to_safe_number(&json!(""), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(to_safe_number(&json!("NaN"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_negative_values_fall_back() {
        assert_eq!(to_safe_number(&json!(-0.01), dec!(7)), dec!(7));
        assert_eq!(to_safe_number(&json!("-12"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_non_numeric_values_fall_back() {
        assert_eq!(to_safe_number(&json!(true), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(to_safe_number(&json!([1]), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(to_safe_number(&json!({"a": 1}), dec!(2)), dec!(2));
    }

    #[test]
    fn test_float_entry_point() {
        assert_eq!(safe_from_f64(f64::NAN, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_from_f64(f64::INFINITY, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_from_f64(-1.0, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_from_f64(2.5, Decimal::ZERO), dec!(2.5));
    }

    #[test]
    fn test_flags() {
        assert!(to_safe_flag(&json!(true)));
        assert!(to_safe_flag(&json!("on")));
        assert!(to_safe_flag(&json!(1)));
        assert!(!to_safe_flag(&json!(null)));
        assert!(!to_safe_flag(&json!("off")));
    }

    #[test]
    fn test_saturation() {
        assert_eq!(saturating_mul(Decimal::MAX, dec!(2)), Decimal::MAX);
        assert_eq!(saturating_add(Decimal::MAX, dec!(1)), Decimal::MAX);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(to_safe_text(&json!("Câble")), "Câble");
        assert_eq!(to_safe_text(&json!(3)), "3");
        assert_eq!(to_safe_text(&json!(null)), "");
        assert_eq!(to_safe_text(&json!(true)), "");
        assert_eq!(to_safe_text(&json!({"fr": "x"})), "");
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Priced {
        #[serde(default, with = "lenient_amount")]
        price: Decimal,
    }

    #[test]
    fn test_amount_with_many_digits_survives_serialization() {
        let priced = Priced { price: dec!(12345678901234.567) };
        let value = serde_json::to_value(&priced).unwrap();
        assert_eq!(value["price"], json!("12345678901234.567"));

        let back: Priced = serde_json::from_value(value).unwrap();
        assert_eq!(back, priced);
    }

    #[test]
    fn test_short_amount_serializes_as_number() {
        let value = serde_json::to_value(Priced { price: dec!(17.100) }).unwrap();
        assert_eq!(value["price"], json!(17.1));
    }

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Block {
        #[serde(default, with = "lenient_text")]
        label: String,
    }

    #[test]
    fn test_block_falls_back_on_null_and_wrong_shape() {
        let fallback = || Block { label: "défaut".to_string() };
        assert_eq!(block_or(json!(null), fallback).label, "défaut");
        assert_eq!(block_or(json!("oops"), fallback).label, "défaut");
        assert_eq!(block_or(json!({"label": null}), fallback).label, "");
    }
}
