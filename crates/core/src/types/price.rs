//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input is not a decimal number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
}

/// A non-negative amount in the store's display currency.
///
/// Arithmetic is exact; rounding to two places only happens when the price is
/// rendered.
///
/// ```
/// use pocketcart_core::Price;
///
/// let total: Price = [Price::parse("10.00").unwrap().times(2), Price::parse("5.5").unwrap()]
///     .into_iter()
///     .sum();
/// assert_eq!(total.to_string(), "25.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents (paise, pence...).
    #[must_use]
    pub fn from_minor_units(minor: u64) -> Self {
        Self(Decimal::from(minor) / Decimal::ONE_HUNDRED)
    }

    /// Parse a price from its decimal text form, e.g. `"109.95"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a decimal or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber(s.to_string()))?;
        Self::new(amount)
    }

    /// The exact amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity. Saturates at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// The amount rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format with a currency symbol, e.g. `₹25.50`.
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        format!("{}{self}", currency.symbol())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Decimal::MAX`].
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The symbol printed before amounts.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency code: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::parse("100").unwrap().to_string(), "100.00");
        assert_eq!(Price::parse("5.5").unwrap().to_string(), "5.50");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Price::parse("0.125").unwrap().to_string(), "0.13");
        assert_eq!(Price::parse("0.124").unwrap().to_string(), "0.12");
    }

    #[test]
    fn test_sum_is_exact() {
        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic.
        let total: Price = ["0.1", "0.2"].iter().map(|s| Price::parse(s).unwrap()).sum();
        assert_eq!(total.amount(), Decimal::from_str("0.3").unwrap());
    }

    #[test]
    fn test_times() {
        let price = Price::parse("109.95").unwrap();
        assert_eq!(price.times(3).to_string(), "329.85");
        assert_eq!(price.times(0), Price::ZERO);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            Price::parse("-1"),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::parse("-0").is_ok());
    }

    #[test]
    fn test_not_a_number() {
        assert!(matches!(
            Price::parse("ten"),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(Price::from_minor_units(2550).to_string(), "25.50");
    }

    #[test]
    fn test_display_with_currency() {
        let price = Price::parse("25.5").unwrap();
        assert_eq!(price.display(CurrencyCode::INR), "₹25.50");
        assert_eq!(price.display(CurrencyCode::USD), "$25.50");
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Price::new(Decimal::MAX).unwrap();
        assert_eq!(max.times(2), max);
        assert_eq!(max + Price::parse("0.01").unwrap(), max);
        assert_eq!([max, max, max].into_iter().sum::<Price>(), max);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<CurrencyCode>(), Ok(CurrencyCode::USD));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
