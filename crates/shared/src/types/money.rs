//! Money type in integer minor units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `i64` counts of the currency's smallest unit (paise for INR).
//! `Decimal` is only used to render an amount in major units.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., paise).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian Rupee
    Inr,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Indonesian Rupiah
    Idr,
    /// Japanese Yen
    Jpy,
}

impl Currency {
    /// Number of decimal places between the major and the minor unit.
    #[must_use]
    pub const fn exponent(self) -> u32 {
        match self {
            Self::Jpy => 0,
            Self::Inr | Self::Usd | Self::Eur | Self::Sgd | Self::Idr => 2,
        }
    }

    /// Returns the ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Sgd => "SGD",
            Self::Idr => "IDR",
            Self::Jpy => "JPY",
        }
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Adds two amounts of the same currency.
    ///
    /// Returns `None` on currency mismatch or overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency))
    }

    /// Subtracts an amount of the same currency.
    ///
    /// Returns `None` on currency mismatch or overflow.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Self::new(amount, self.currency))
    }

    /// The amount expressed in major units (`50000` paise → `500.00`).
    #[must_use]
    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.amount, self.currency.exponent())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_major(), self.currency)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INR" => Ok(Self::Inr),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            "IDR" => Ok(Self::Idr),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Inr);
        assert!(money.is_zero());
        assert!(!money.is_negative());
        assert_eq!(money.currency, Currency::Inr);
    }

    #[test]
    fn test_to_major_uses_exponent() {
        assert_eq!(Money::new(50_000, Currency::Inr).to_major(), dec!(500.00));
        assert_eq!(Money::new(1_234, Currency::Jpy).to_major(), dec!(1234));
        assert_eq!(Money::new(-5, Currency::Usd).to_major(), dec!(-0.05));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(30_000, Currency::Inr).to_string(), "300.00 INR");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::new(100, Currency::Inr);
        let b = Money::new(40, Currency::Inr);
        assert_eq!(a.checked_add(b), Some(Money::new(140, Currency::Inr)));
        assert_eq!(a.checked_sub(b), Some(Money::new(60, Currency::Inr)));
        assert_eq!(a.checked_add(Money::new(1, Currency::Usd)), None);
        assert_eq!(Money::new(i64::MAX, Currency::Inr).checked_add(a), None);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("INR").unwrap(), Currency::Inr);
        assert_eq!(Currency::from_str("inr").unwrap(), Currency::Inr);
        assert_eq!(Currency::from_str("JPY").unwrap(), Currency::Jpy);
        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Inr).unwrap(), "\"INR\"");
        let amount = serde_json::to_value(Money::new(50_000, Currency::Inr)).unwrap();
        assert_eq!(amount["amount"], serde_json::json!(50000));
    }
}
