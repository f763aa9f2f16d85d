//! Fixed-point token amounts ("Qirat" — the smallest-unit integer denomination;
//! 1 coin = 10^6 Qirat). String representations in transit are decimal integers,
//! never floats, so the amount can never silently lose precision crossing a
//! serde boundary.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qirat(pub i128);

#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be a decimal integer, got: {0}")]
    NotAnInteger(String),
    #[error("amount must not be negative: {0}")]
    Negative(i128),
}

impl Qirat {
    pub const ZERO: Qirat = Qirat(0);

    pub fn new(value: i128) -> Self {
        Self(value)
    }

    pub fn checked_add(self, other: Qirat) -> Option<Qirat> {
        self.0.checked_add(other.0).map(Qirat)
    }

    pub fn checked_sub(self, other: Qirat) -> Option<Qirat> {
        self.0.checked_sub(other.0).map(Qirat)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Qirat {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i128 = s
            .trim()
            .parse()
            .map_err(|_| AmountError::NotAnInteger(s.to_string()))?;
        if value < 0 {
            return Err(AmountError::Negative(value));
        }
        Ok(Qirat(value))
    }
}

impl fmt::Display for Qirat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Qirat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Qirat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Qirat::from_str(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_integer_string() {
        assert_eq!(Qirat::from_str("1000000").unwrap(), Qirat(1_000_000));
    }

    #[test]
    fn rejects_non_integer() {
        assert!(Qirat::from_str("1.5").is_err());
        assert!(Qirat::from_str("abc").is_err());
    }

    #[test]
    fn rejects_negative() {
        assert!(Qirat::from_str("-5").is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let q = Qirat(42);
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"42\"");
        let back: Qirat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn checked_add_overflow_returns_none() {
        let max = Qirat(i128::MAX);
        assert!(max.checked_add(Qirat(1)).is_none());
    }
}
