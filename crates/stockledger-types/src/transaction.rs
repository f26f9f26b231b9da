//! Trade records appended to a user's transaction log.
//!
//! A [`Transaction`] is immutable once recorded. The log itself is kept in
//! insertion order; chronological views are derived from
//! [`TradeTimestamp`] ordering on read.

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Direction of a recorded trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for TradeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(format!("unknown trade type {other:?}")),
        }
    }
}

/// Time a trade was recorded.
///
/// Stored as text and ordered lexicographically. Timestamps generated by
/// [`TradeTimestamp::now`] use [`constants::TIMESTAMP_FORMAT`], which sorts
/// chronologically; strings read back from a table are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TradeTimestamp(pub String);

impl TradeTimestamp {
    /// Local wall-clock time, second resolution.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().format(constants::TIMESTAMP_FORMAT).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TradeTimestamp {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TradeTimestamp {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TradeTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single buy or sell in the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub symbol: String,
    /// Trade price for buys; the position's average price for sells.
    pub price: Decimal,
    pub kind: TradeKind,
    pub timestamp: TradeTimestamp,
}

impl Transaction {
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        kind: TradeKind,
        timestamp: TradeTimestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            kind,
            timestamp,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} @ {}",
            self.timestamp, self.kind, self.symbol, self.price
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Transaction {
    /// A transaction stamped at a fixed second offset from a fixed base time.
    pub fn dummy(symbol: &str, price: Decimal, kind: TradeKind, second: u32) -> Self {
        Self::new(
            symbol,
            price,
            kind,
            TradeTimestamp(format!("2024-01-01 00:{:02}:{:02}", second / 60, second % 60)),
        )
    }
}
