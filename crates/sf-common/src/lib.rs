use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod logging;

// ============================================================================
// Money
// ============================================================================

/// Supported settlement currencies.
///
/// Stored as ISO 4217 lowercase codes to match the payment processor's
/// wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Default for Currency {
    fn default() -> Self {
        Self::Usd
    }
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "\u{20ac}",
            Currency::Gbp => "\u{a3}",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "usd" => Some(Currency::Usd),
            "eur" => Some(Currency::Eur),
            "gbp" => Some(Currency::Gbp),
            _ => None,
        }
    }
}

/// A monetary amount in minor units (cents).
///
/// All prices and revenue figures flow through the system as integer
/// cents; floating point is only introduced at the display/analytics edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct Money {
    pub amount_cents: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self { amount_cents, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self { amount_cents: 0, currency }
    }

    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Format for display, e.g. "$19.99".
    pub fn display(&self) -> String {
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        format!("{}{}{}.{:02}", sign, self.currency.symbol(), abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_roundtrip() {
        assert_eq!(Currency::parse("USD"), Some(Currency::Usd));
        assert_eq!(Currency::parse("eur"), Some(Currency::Eur));
        assert_eq!(Currency::parse("chf"), None);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(1999, Currency::Usd).display(), "$19.99");
        assert_eq!(Money::new(5, Currency::Usd).display(), "$0.05");
        assert_eq!(Money::new(-250, Currency::Gbp).display(), "-\u{a3}2.50");
    }
}
