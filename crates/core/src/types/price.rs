//! Type-safe price representation using decimal arithmetic.
//!
//! All amounts are in Indian rupees; the store never deals with another
//! currency, so there is no currency code on the type.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when constructing a [`UnitPrice`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Prices are never negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),

    /// The input could not be parsed as a decimal amount.
    #[error("invalid price '{0}'")]
    Invalid(String),
}

/// A non-negative price for a single unit of a product.
///
/// Serialized as a JSON number, which is what the API and the persisted
/// cart blob use. Deserializes from either a number or a numeric string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The amount in rupees.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl std::str::FromStr for UnitPrice {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_rupees(self.0))
    }
}

impl Serialize for UnitPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for UnitPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Format an amount for display (e.g., "₹1999.00").
#[must_use]
pub fn format_rupees(amount: Decimal) -> String {
    format!("₹{:.2}", amount.round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let result = UnitPrice::new(Decimal::from(-1));
        assert_eq!(result, Err(PriceError::Negative(Decimal::from(-1))));
    }

    #[test]
    fn test_zero_price_allowed() {
        assert_eq!(UnitPrice::new(Decimal::ZERO).unwrap(), UnitPrice::ZERO);
    }

    #[test]
    fn test_parse_price() {
        let price: UnitPrice = "599.50".parse().unwrap();
        assert_eq!(price.amount(), Decimal::new(59950, 2));
        assert!("abc".parse::<UnitPrice>().is_err());
        assert!("-5".parse::<UnitPrice>().is_err());
    }

    #[test]
    fn test_times() {
        assert_eq!(UnitPrice::from_rupees(599).times(2), Decimal::from(1198));
    }

    #[test]
    fn test_display() {
        assert_eq!(UnitPrice::from_rupees(1999).to_string(), "₹1999.00");
        assert_eq!(format_rupees(Decimal::new(362_318, 2)), "₹3623.18");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: UnitPrice = serde_json::from_str("100").unwrap();
        let from_string: UnitPrice = serde_json::from_str("\"100\"").unwrap();
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<UnitPrice>("-3").is_err());
    }

    #[test]
    fn test_deserialize_fractional_amount() {
        let from_number: UnitPrice = serde_json::from_str("899.5").unwrap();
        let from_string: UnitPrice = serde_json::from_str("\"450.00\"").unwrap();
        assert_eq!(from_number.amount(), Decimal::new(8995, 1));
        assert_eq!(from_string.amount(), Decimal::new(450, 0));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_value(UnitPrice::from_rupees(50)).unwrap();
        assert!(json.is_number());
    }
}
