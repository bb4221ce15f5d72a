//! Currency amounts with a fixed precision of two decimal places.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

lazy_static! {
    /// Plain decimal notation: digits, optionally followed by a fraction.
    /// Signs, exponents and thousands separators are rejected.
    static ref DECIMAL_REGEX: Regex = Regex::new(r"^([0-9]*)(?:\.([0-9]*))?$").unwrap();
}

const CENTS_PER_UNIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("not a plain decimal number")]
    Invalid,
    #[error("more than two decimal places")]
    TooPrecise,
}

/// A monetary value stored as a whole number of cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Amount::from_units(50)` is 50.00
    pub fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(CENTS_PER_UNIT))
    }

    /// Convert a wire value, rounding to the nearest cent
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * CENTS_PER_UNIT as f64).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Parse user input such as `"50"`, `"12.5"` or `".99"`.
    ///
    /// Trailing zeros beyond the second decimal place are accepted
    /// (`"1.500"`), any other third decimal digit is not.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let input = input.trim();
        let captures = DECIMAL_REGEX.captures(input).ok_or(AmountError::Invalid)?;

        let whole = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let fraction = captures
            .get(2)
            .map(|m| m.as_str().trim_end_matches('0'))
            .unwrap_or("");

        if whole.is_empty() && captures.get(2).map_or(true, |m| m.as_str().is_empty()) {
            return Err(AmountError::Invalid);
        }
        if fraction.len() > 2 {
            return Err(AmountError::TooPrecise);
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| AmountError::Invalid)?
        };
        let cents: i64 = format!("{:0<2}", fraction)
            .parse()
            .map_err(|_| AmountError::Invalid)?;

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .map(Amount)
            .ok_or(AmountError::Invalid)
    }
}

impl fmt::Display for Amount {
    /// Whole amounts print without decimals (`300`), others with two (`12.50`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / CENTS_PER_UNIT as u64;
        let cents = abs % CENTS_PER_UNIT as u64;
        if cents == 0 {
            write!(f, "{}{}", sign, units)
        } else {
            write!(f, "{}{}.{:02}", sign, units, cents)
        }
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % CENTS_PER_UNIT == 0 {
            serializer.serialize_i64(self.0 / CENTS_PER_UNIT)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {}", value)))
    }
}
