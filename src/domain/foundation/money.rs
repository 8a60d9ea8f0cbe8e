//! Monetary amounts.
//!
//! All financial arithmetic is decimal-precise with an explicit currency
//! code. Binary floats never touch money.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{DomainError, ErrorCode};

/// A decimal amount in an explicit ISO-4217 currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.round_dp(2),
            currency: currency.into(),
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Adds another amount; currencies must match.
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        self.same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency.clone()))
    }

    /// Subtracts another amount; currencies must match.
    pub fn sub(&self, other: &Money) -> Result<Money, DomainError> {
        self.same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, self.currency.clone()))
    }

    /// Scales the amount by a decimal factor, rounding to cents.
    pub fn scale(&self, factor: Decimal) -> Money {
        Money::new(self.amount * factor, self.currency.clone())
    }

    fn same_currency(&self, other: &Money) -> Result<(), DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::new(
                ErrorCode::Internal,
                format!(
                    "currency mismatch: {} vs {}",
                    self.currency, other.currency
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn usd(s: &str) -> Money {
        Money::new(d(s), "USD")
    }

    #[test]
    fn construction_rounds_to_cents() {
        assert_eq!(usd("10.555").amount, d("10.56"));
    }

    #[test]
    fn add_and_sub_preserve_currency() {
        let a = usd("100.00");
        let b = usd("37.50");
        assert_eq!(a.add(&b).unwrap().amount, d("137.50"));
        assert_eq!(a.sub(&b).unwrap().amount, d("62.50"));
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let a = usd("100");
        let b = Money::new(d("100"), "EUR");
        assert!(a.add(&b).is_err());
        assert!(a.sub(&b).is_err());
    }

    #[test]
    fn scale_rounds_to_cents() {
        let a = usd("1000.00");
        assert_eq!(a.scale(d("0.5")).amount, d("500.00"));
        assert_eq!(a.scale(d("0.333")).amount, d("333.00"));
    }

    #[test]
    fn display_includes_currency() {
        let a = Money::new(d("75"), "EUR");
        assert_eq!(a.to_string(), "75.00 EUR");
    }
}
