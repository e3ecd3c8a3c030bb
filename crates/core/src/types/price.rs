//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Returns `None` if the amount overflows.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Option<Self> {
        Some(Self {
            amount: self.amount.checked_mul(Decimal::from(quantity))?,
            currency_code: self.currency_code.clone(),
        })
    }
}

/// ISO 4217 currency codes.
///
/// Codes outside the common set are kept verbatim in [`CurrencyCode::Other`]
/// so that display can still fall back to `"<amount> <CODE>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    Other(String),
}

impl CurrencyCode {
    /// The ISO code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::Other(code) => code,
        }
    }

    /// Display symbol, if the currency has a well-known one.
    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD => Some("$"),
            Self::CAD => Some("CA$"),
            Self::AUD => Some("A$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::Other(_) => None,
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            "CAD" => Self::CAD,
            "AUD" => Self::AUD,
            _ => Self::Other(upper),
        })
    }
}

impl From<String> for CurrencyCode {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_owned()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
