//! Month keys for per-month document numbering
//!
//! Sequence counters restart every calendar month. A [`MonthKey`] is the
//! `YYYYMM` string that identifies one of those numbering periods and is
//! used verbatim as a key in the persisted ledger file.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month key: {0}")]
    InvalidMonthKey(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// A `YYYYMM` numbering period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a month key, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(TemporalError::InvalidMonthKey(format!("{:04}{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// The numbering period a document dated `date` belongs to
    ///
    /// Years outside `0..=9999` are clamped so the key always has four digits.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(0, 9999),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns true if `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        *self == Self::from_date(date)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(TemporalError::InvalidMonthKey(s.to_string()));
        }
        let year = s[..4]
            .parse()
            .map_err(|_| TemporalError::InvalidMonthKey(s.to_string()))?;
        let month = s[4..]
            .parse()
            .map_err(|_| TemporalError::InvalidMonthKey(s.to_string()))?;
        Self::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Parses an ISO `YYYY-MM-DD` date, tolerating surrounding whitespace and a
/// trailing time part (`2024-05-03T10:00:00Z`)
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, TemporalError> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| TemporalError::InvalidDate(raw.to_string()))
}
