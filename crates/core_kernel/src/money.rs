//! Currency labels and percentage rates
//!
//! Amounts are plain `rust_decimal::Decimal` values throughout the invoicing
//! core. A document carries a currency only as a display label: there is no
//! conversion between currencies.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numeric::saturating_mul;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Tunisian dinar, 1000 millimes
    #[default]
    TND,
    EUR,
    USD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::TND => 3,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::TND => "DT",
            Currency::EUR => "€",
            Currency::USD => "$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::TND => "TND",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
        }
    }

    /// Rounds an amount to this currency's minor unit, half away from zero
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Formats an amount for display, e.g. `1 234,500 DT`
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = self.round(amount);
        let dp = self.decimal_places() as usize;
        let raw = format!("{:.dp$}", rounded.abs(), dp = dp);
        let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        if frac_part.is_empty() {
            format!("{}{} {}", sign, grouped, self.symbol())
        } else {
            format!("{}{},{} {}", sign, grouped, frac_part, self.symbol())
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TND" | "DT" => Ok(Currency::TND),
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            other => Err(format!("Unknown currency: {}", other)),
        }
    }
}

/// A percentage rate (TVA, discount, FODEC, withholding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.19 for 19%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a percentage (e.g., 19 for 19%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to an amount, saturating instead of overflowing
    pub fn apply(&self, amount: Decimal) -> Decimal {
        saturating_mul(amount, self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}
