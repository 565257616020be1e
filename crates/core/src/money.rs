use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// A currency-agnostic amount held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Zero at two decimal places, so it prints and serializes as `0.00`.
    pub fn zero() -> Self {
        Money(Decimal::new(0, 2))
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// `None` when the product does not fit a `Decimal`.
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Accepts OCR-style amounts: an optional leading currency sign and
/// thousands separators, e.g. `¥1,234.50`.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['¥', '￥', '$']).trim_start();
        let clean = trimmed.replace(',', "");
        Decimal::from_str(&clean).map(Money::from_decimal)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;
    fn mul(self, quantity: u32) -> Self {
        Money(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decorated_amounts() {
        assert_eq!("49.99".parse::<Money>().unwrap(), Money::from_cents(4999));
        assert_eq!("¥25.50".parse::<Money>().unwrap(), Money::from_cents(2550));
        assert_eq!("￥ 3".parse::<Money>().unwrap(), Money::from_cents(300));
        assert_eq!("1,234.56".parse::<Money>().unwrap(), Money::from_cents(123456));
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn rounds_to_two_places() {
        let m = Money::from_decimal(Decimal::new(12346, 3));
        assert_eq!(m.to_string(), "12.35");
    }

    #[test]
    fn arithmetic() {
        let five = Money::from_cents(500);
        assert_eq!(five * 3, Money::from_cents(1500));
        assert_eq!(five + five - Money::from_cents(100), Money::from_cents(900));
        let total: Money = [five, Money::from_cents(250)].iter().sum();
        assert_eq!(total, Money::from_cents(750));
    }

    #[test]
    fn checked_mul_reports_overflow() {
        assert_eq!(Money::from_cents(250).checked_mul(4), Some(Money::from_cents(1000)));
        let huge: Money = "9999999999999999999999999999".parse().unwrap();
        assert_eq!(huge.checked_mul(4_000_000_000), None);
    }

    #[test]
    fn sign_checks() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_cents(-1).is_positive());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn display_keeps_trailing_zeros() {
        assert_eq!(Money::from_cents(1000).to_string(), "10.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(550)).unwrap();
        assert_eq!(json, "\"5.50\"");
        assert_eq!(serde_json::to_string(&Money::zero()).unwrap(), "\"0.00\"");
        assert_eq!(serde_json::to_string(&Money::default()).unwrap(), "\"0.00\"");
    }
}
