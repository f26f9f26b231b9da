//! Holdings held in the price index, one per symbol.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result};

/// Current holding of a single symbol.
///
/// A position whose quantity has been sold down to zero stays in the
/// index; it is never removed implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Case-sensitive key; the index orders positions by this field.
    pub symbol: String,
    /// Quantity-weighted mean of all buy prices (never negative).
    pub average_price: Decimal,
    /// Shares currently held.
    pub quantity: u64,
}

impl Position {
    #[must_use]
    pub fn new(symbol: impl Into<String>, average_price: Decimal, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            average_price,
            quantity,
        }
    }

    /// Total cost of the shares held (average price × quantity).
    #[must_use]
    pub fn cost_basis(&self) -> Decimal {
        self.average_price * Decimal::from(self.quantity)
    }

    /// Returns `true` once every share has been sold.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: Price=${}, Quantity={}",
            self.symbol, self.average_price, self.quantity
        )
    }
}

/// Reject symbols that cannot serve as an index key.
pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(LedgerError::InvalidSymbol {
            reason: "symbol is empty".into(),
        });
    }
    if symbol.chars().any(char::is_control) {
        return Err(LedgerError::InvalidSymbol {
            reason: format!("symbol {symbol:?} contains control characters"),
        });
    }
    Ok(())
}
