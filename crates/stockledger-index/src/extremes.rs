//! Append-only transaction log with O(1) access to the price extremes.
//!
//! Every recorded [`Transaction`] is appended to the log and copied into a
//! min-heap and a max-heap keyed by price. Heaps are derived indices: they
//! are only ever peeked, never popped, so they always reflect the global
//! minimum and maximum over the whole history.

use rust_decimal::Decimal;
use stockledger_types::{TradeKind, TradeTimestamp, Transaction};

use crate::heap::BinaryHeap;

/// Transaction log plus lowest/highest price tracking.
#[derive(Debug, Clone)]
pub struct ExtremesTracker {
    /// Canonical log, insertion order.
    log: Vec<Transaction>,
    lows: BinaryHeap<Transaction>,
    highs: BinaryHeap<Transaction>,
}

impl ExtremesTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            lows: BinaryHeap::min(),
            highs: BinaryHeap::max(),
        }
    }

    /// Rebuild a tracker by replaying `rows` in order.
    #[must_use]
    pub fn from_transactions(rows: impl IntoIterator<Item = Transaction>) -> Self {
        let mut tracker = Self::new();
        tracker.load_from_table(rows);
        tracker
    }

    /// Append a trade and index its price. O(log n).
    pub fn record(
        &mut self,
        symbol: impl Into<String>,
        price: Decimal,
        kind: TradeKind,
        timestamp: TradeTimestamp,
    ) {
        self.record_transaction(Transaction::new(symbol, price, kind, timestamp));
    }

    /// Append an already-built transaction.
    pub fn record_transaction(&mut self, tx: Transaction) {
        self.lows.push(tx.clone(), tx.price);
        self.highs.push(tx.clone(), tx.price);
        self.log.push(tx);
    }

    /// Cheapest trade ever recorded, or `None` before the first trade.
    #[must_use]
    pub fn lowest(&self) -> Option<&Transaction> {
        self.lows.peek()
    }

    /// Most expensive trade ever recorded, or `None` before the first trade.
    #[must_use]
    pub fn highest(&self) -> Option<&Transaction> {
        self.highs.peek()
    }

    /// All trades ordered by timestamp; equal timestamps keep log order.
    #[must_use]
    pub fn full_history(&self) -> Vec<Transaction> {
        let mut history = self.log.clone();
        // `sort_by` is stable.
        history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        history
    }

    /// The log in insertion order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Replay `rows` through [`record_transaction`](Self::record_transaction).
    pub fn load_from_table(&mut self, rows: impl IntoIterator<Item = Transaction>) {
        let before = self.log.len();
        for row in rows {
            self.record_transaction(row);
        }
        tracing::debug!(
            loaded = self.log.len() - before,
            total = self.log.len(),
            "Transaction log rehydrated"
        );
    }

    /// Rows for export, in insertion order.
    pub fn save_to_table(&self) -> impl Iterator<Item = &Transaction> {
        self.log.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

impl Default for ExtremesTracker {
    fn default() -> Self {
        Self::new()
    }
}
