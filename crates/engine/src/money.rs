//! Money amounts as integer kopecks.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Money amount represented as **integer kopecks**.
///
/// Use this type for all monetary values (service prices, ledger amounts,
/// report totals) to avoid floating-point drift. Snapshots store the raw
/// kopeck value.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let price = Money::new(1500_00);
/// assert_eq!(price.kopecks(), 150_000);
/// assert_eq!(price.to_string(), "1500.00 ₽");
/// assert_eq!("1500".parse::<Money>().unwrap(), price);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn new(kopecks: i64) -> Self {
        Self(kopecks)
    }

    #[must_use]
    pub const fn kopecks(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02} ₽", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into kopecks.
    ///
    /// Accepts `.` or `,` as decimal separator and at most two fractional
    /// digits; rejects everything else.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(s.to_string());

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if rest.is_empty() {
            return Err(invalid());
        }

        let normalized = rest.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (normalized.as_str(), ""),
        };

        let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || frac.len() > 2 || (!frac.is_empty() && !all_digits(frac)) {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let kopecks: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let total = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(kopecks))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_rubles() {
        assert_eq!(Money::new(0).to_string(), "0.00 ₽");
        assert_eq!(Money::new(5).to_string(), "0.05 ₽");
        assert_eq!(Money::new(150_050).to_string(), "1500.50 ₽");
        assert_eq!(Money::new(-1050).to_string(), "-10.50 ₽");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("1500".parse::<Money>().unwrap().kopecks(), 150_000);
        assert_eq!("10.5".parse::<Money>().unwrap().kopecks(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().kopecks(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().kopecks(), -1);
    }

    #[test]
    fn parse_rejects_invalid() {
        for raw in ["", "abc", "12.345", "1.2.3", ".", "10.x"] {
            assert!(raw.parse::<Money>().is_err(), "expected {raw:?} rejected");
        }
    }

    #[test]
    fn sums() {
        let total: Money = [Money::new(100), Money::new(250)].into_iter().sum();
        assert_eq!(total, Money::new(350));
    }
}
