//! Amount type for handling Rupiah values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses values that may carry
//! an `Rp` prefix and comma thousands separators, and displays them the way Indonesian Rupiah is
//! usually written, with dots between thousands and no fraction digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Represents an amount of money in Rupiah.
///
/// Display formatting is for people; serialization uses the plain decimal string so that values
/// survive a round trip through JSON or SQLite unchanged.
///
/// # Examples
///
/// ```
/// # use smart_campus::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rp 1,500,000").unwrap();
/// assert_eq!(amount.to_string(), "Rp 1.500.000");
///
/// let negative = Amount::from_str("-50000").unwrap();
/// assert_eq!(negative.to_string(), "-Rp 50.000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        // "Rp" and "Rp." are both common
        let unsigned = unsigned
            .strip_prefix("Rp.")
            .or_else(|| unsigned.strip_prefix("Rp"))
            .unwrap_or(unsigned)
            .trim_start();

        let without_commas = unsigned.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let rounded = self.0.abs().round().to_string();
        let digits = rounded.split('.').next().unwrap_or_default();
        write!(f, "{sign}Rp {}", group_thousands(digits))
    }
}

/// Puts a dot between every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

// Sums saturate at the bounds of `Decimal` instead of panicking.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(amt("50000").value(), Decimal::from(50000));
    }

    #[test]
    fn test_parse_with_rp_prefix() {
        assert_eq!(amt("Rp 50000").value(), Decimal::from(50000));
        assert_eq!(amt("Rp50000").value(), Decimal::from(50000));
        assert_eq!(amt("Rp. 50000").value(), Decimal::from(50000));
    }

    #[test]
    fn test_parse_negative_with_prefix() {
        assert_eq!(amt("-Rp 50,000").value(), Decimal::from(-50000));
    }

    #[test]
    fn test_parse_commas() {
        assert_eq!(amt("1,234,567").value(), Decimal::from(1234567));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(amt("12.5").value(), Decimal::from_str("12.5").unwrap());
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(amt("   ").is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("lima ribu").is_err());
    }

    #[test]
    fn test_display_groups_with_dots() {
        assert_eq!(Amount::from(1500000i64).to_string(), "Rp 1.500.000");
        assert_eq!(Amount::from(999i64).to_string(), "Rp 999");
    }

    #[test]
    fn test_display_keeps_every_digit() {
        assert_eq!(
            amt("12345678901234567890").to_string(),
            "Rp 12.345.678.901.234.567.890"
        );
        assert_eq!(amt("123456.6").to_string(), "Rp 123.457");
        assert_eq!(amt("1000").to_string(), "Rp 1.000");
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(max + max, max);
        let mut total = max;
        total += Amount::from(1i64);
        assert_eq!(total, max);
        assert_eq!(Amount::new(Decimal::MIN) - max, Amount::new(Decimal::MIN));
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Amount::from(-50000i64).to_string(), "-Rp 50.000");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(Amount::ZERO.to_string(), "Rp 0");
        assert!(!Amount::ZERO.is_negative());
    }

    #[test]
    fn test_serialize_is_plain_decimal() {
        let json = serde_json::to_string(&amt("12.50")).unwrap();
        assert_eq!(json, "\"12.50\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amt("12.50"));
    }

    #[test]
    fn test_arithmetic() {
        let total: Amount = [amt("100"), amt("40"), amt("60")].iter().sum();
        assert_eq!(total, Amount::from(200i64));
        assert_eq!(amt("40") - amt("100"), Amount::from(-60i64));
    }
}
