//! Fixed-precision USD amounts.
//!
//! Every currency figure CostPilot emits carries exactly two decimal
//! digits, and repeated runs over the same input must be byte-identical.
//! `Money` stores integer cents so rate arithmetic cannot accumulate
//! floating-point drift, and serializes as a fixed two-decimal string
//! ("320.00") since a JSON number cannot hold a trailing ".00".

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A USD amount in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build from raw dollar arithmetic, rounding to the cent half away
    /// from zero (half-up for the non-negative deltas the predictor
    /// produces).
    pub fn from_dollars(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Deltas are reported as non-negative figures.
    pub fn clamp_non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Scale by a dimensionless factor, rounding half-up.
    pub fn scale(self, factor: f64) -> Self {
        Money::from_dollars(self.as_dollars() * factor)
    }

    /// Midpoint of a range, rounding half-up.
    pub fn midpoint(low: Money, high: Money) -> Self {
        Money::from_dollars((low.as_dollars() + high.as_dollars()) / 2.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let (whole, frac) = match rest.split_once('.') {
            Some((w, f)) => (w, f),
            None => (rest, ""),
        };
        let whole: i64 = whole
            .parse()
            .map_err(|_| format!("invalid currency amount '{}'", s))?;
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => {
                10 * frac
                    .parse::<i64>()
                    .map_err(|_| format!("invalid currency amount '{}'", s))?
            }
            2 => frac
                .parse()
                .map_err(|_| format!("invalid currency amount '{}'", s))?,
            _ => return Err(format!("more than two decimal digits in '{}'", s)),
        };
        Ok(Money(sign * (whole * 100 + frac_cents)))
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
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
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_to_the_cent() {
        assert_eq!(Money::from_dollars(1.235).cents(), 124);
        assert_eq!(Money::from_dollars(1.234).cents(), 123);
        assert_eq!(Money::from_dollars(227.759_999_9).cents(), 22776);
    }

    #[test]
    fn displays_exactly_two_decimals() {
        assert_eq!(Money::from_cents(32000).to_string(), "320.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn round_trips_through_strings() {
        for s in ["0.00", "320.00", "455.52", "12.30"] {
            let m: Money = s.parse().unwrap();
            assert_eq!(m.to_string(), s);
        }
    }

    #[test]
    fn rejects_over_precise_strings() {
        assert!("1.005".parse::<Money>().is_err());
    }

    #[test]
    fn scales_with_rounding() {
        let delta = Money::from_cents(11388); // 113.88
        assert_eq!(delta.scale(2.0).to_string(), "227.76");
        assert_eq!(delta.scale(4.0).to_string(), "455.52");
    }
}
