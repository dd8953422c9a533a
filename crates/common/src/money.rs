//! Fixed-point money type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a decimal money string fails.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid money amount: {input}")]
pub struct MoneyParseError {
    /// The string that failed to parse.
    pub input: String,
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = 10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole unit value.
    pub fn from_units(units: i64) -> Self {
        Self { cents: units * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Formats the amount as a plain fixed-point decimal string ("10.00").
    ///
    /// This is the wire format used by the HTTP API for prices, subtotals,
    /// and totals.
    pub fn to_decimal_string(&self) -> String {
        if self.cents < 0 {
            format!("-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            format!("{}.{:02}", self.units(), self.cents_part())
        }
    }

    /// Parses a plain decimal string ("10", "10.5", "10.00") into money.
    pub fn parse_decimal(input: &str) -> Result<Self, MoneyParseError> {
        let err = || MoneyParseError {
            input: input.to_string(),
        };

        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() || frac.len() > 2 {
            return Err(err());
        }

        let units: i64 = whole.parse().map_err(|_| err())?;
        let frac_cents: i64 = if frac.is_empty() {
            0
        } else {
            let parsed: i64 = frac.parse().map_err(|_| err())?;
            if frac.len() == 1 { parsed * 10 } else { parsed }
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(err)?;

        Ok(Money {
            cents: if negative { -cents } else { cents },
        })
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.units(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_from_units() {
        let money = Money::from_units(50);
        assert_eq!(money.cents(), 5000);
    }

    #[test]
    fn test_decimal_string_formatting() {
        assert_eq!(Money::from_cents(1234).to_decimal_string(), "12.34");
        assert_eq!(Money::from_cents(100).to_decimal_string(), "1.00");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_decimal_string(), "-12.34");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("10.00").unwrap().cents(), 1000);
        assert_eq!(Money::parse_decimal("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse_decimal("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse_decimal("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse_decimal("-3.25").unwrap().cents(), -325);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal("abc").is_err());
        assert!(Money::parse_decimal("1.234").is_err());
        assert!(Money::parse_decimal(".50").is_err());
    }

    #[test]
    fn test_parse_format_roundtrip() {
        let money = Money::from_cents(4299);
        let parsed = Money::parse_decimal(&money.to_decimal_string()).unwrap();
        assert_eq!(parsed, money);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);
    }
}
