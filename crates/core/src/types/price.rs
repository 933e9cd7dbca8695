//! Decimal price representation.
//!
//! The storefront quotes every price in rupees and renders it literally
//! (`₹200`, `₹99.5`). There is no currency conversion or locale formatting.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency symbol prefixed to every rendered price.
pub const CURRENCY_SYMBOL: &str = "₹";

/// A price in rupees.
///
/// Deserializes from a JSON number (`200`, `99.5`) or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_rupees() {
        assert_eq!(Price::from_rupees(200).to_string(), "₹200");
        assert_eq!(Price::ZERO.to_string(), "₹0");
    }

    #[test]
    fn test_display_fractional() {
        let price = Price::new(Decimal::new(995, 1));
        assert_eq!(price.to_string(), "₹99.5");
    }

    #[test]
    fn test_times_and_sum() {
        let line = Price::from_rupees(130).times(3);
        assert_eq!(line, Price::from_rupees(390));

        let total: Price = [Price::from_rupees(50), line].into_iter().sum();
        assert_eq!(total.to_string(), "₹440");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("200").unwrap();
        assert_eq!(price, Price::from_rupees(200));

        let price: Price = serde_json::from_str("99.5").unwrap();
        assert_eq!(price.to_string(), "₹99.5");
    }
}
