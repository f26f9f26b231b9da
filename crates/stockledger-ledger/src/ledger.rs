//! Buy/sell orchestration over one user's position index and trade log.
//!
//! Every mutation is staged, written to both tables, and only then applied
//! in memory. A failed write therefore never leaves the in-memory ledger
//! ahead of (or behind) what was last persisted successfully.

use std::iter;

use rust_decimal::Decimal;
use stockledger_index::{ExtremesTracker, Inorder, PriceIndex};
use stockledger_store::{AuthenticatedUser, CsvStore, SessionLock};
use stockledger_types::{
    LedgerConfig, LedgerError, Position, Result, TradeKind, TradeTimestamp, Transaction,
    constants, validate_symbol,
};

/// One authenticated user's holdings and trade history.
///
/// Holds the user's session lock for as long as it lives; a second
/// `Ledger` for the same user cannot be opened concurrently.
#[derive(Debug)]
pub struct Ledger {
    username: String,
    index: PriceIndex,
    tracker: ExtremesTracker,
    store: CsvStore,
    _lock: SessionLock,
}

impl Ledger {
    /// Claim `user`'s tables and hydrate the ledger from them.
    ///
    /// Missing tables start an empty ledger.
    ///
    /// # Errors
    /// [`LedgerError::SessionBusy`] if the user already has an open ledger,
    /// [`LedgerError::CorruptTable`] or [`LedgerError::Io`] if a table
    /// cannot be read.
    pub fn open(config: &LedgerConfig, user: &AuthenticatedUser) -> Result<Self> {
        let username = user.username();
        let store = CsvStore::for_user(config, username)?;
        let lock = SessionLock::acquire(store.files(), username)?;

        let index = PriceIndex::from_positions(store.load_positions()?)?;
        let tracker = ExtremesTracker::from_transactions(store.load_transactions()?);

        tracing::info!(
            user = username,
            positions = index.len(),
            transactions = tracker.len(),
            "Ledger hydrated"
        );

        Ok(Self {
            username: username.to_string(),
            index,
            tracker,
            store,
            _lock: lock,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    // =================================================================
    // Mutations
    // =================================================================

    /// Buy `quantity` shares of `symbol` at `price`.
    ///
    /// An existing position's average price becomes the quantity-weighted
    /// mean of the old and new cost, rounded to 2 decimal places. The BUY
    /// transaction is logged at the trade price. Returns the updated
    /// position.
    ///
    /// # Errors
    /// Validation errors for a negative price, zero quantity or empty
    /// symbol; [`LedgerError::Io`] if the tables cannot be written (the
    /// ledger is then unchanged).
    pub fn buy(&mut self, symbol: &str, price: Decimal, quantity: u64) -> Result<Position> {
        validate_symbol(symbol)?;
        if price < Decimal::ZERO {
            return Err(LedgerError::InvalidPrice { price });
        }
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity { quantity });
        }

        let staged = match self.index.search(symbol) {
            Some(held) => averaged(held, price, quantity)?,
            None => Position::new(symbol, price, quantity),
        };
        let tx = Transaction::new(symbol, price, TradeKind::Buy, TradeTimestamp::now());

        let position = self.commit(staged, tx)?;
        tracing::info!(
            user = %self.username,
            symbol,
            price = %price,
            quantity,
            average_price = %position.average_price,
            held = position.quantity,
            "Bought"
        );
        Ok(position)
    }

    /// Sell `quantity` shares of `symbol`.
    ///
    /// The average price is left as it was and the SELL transaction is
    /// logged at that average. Selling everything keeps a zero-quantity
    /// position in the index. Returns the updated position.
    ///
    /// # Errors
    /// [`LedgerError::SymbolNotFound`] if nothing was ever bought under
    /// `symbol`, [`LedgerError::InsufficientQuantity`] if fewer shares are
    /// held than requested, [`LedgerError::Io`] if the tables cannot be
    /// written. The ledger is unchanged in every error case.
    pub fn sell(&mut self, symbol: &str, quantity: u64) -> Result<Position> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity { quantity });
        }
        let held = self
            .index
            .search(symbol)
            .ok_or_else(|| LedgerError::SymbolNotFound(symbol.to_string()))?;
        if held.quantity < quantity {
            return Err(LedgerError::InsufficientQuantity {
                symbol: symbol.to_string(),
                requested: quantity,
                held: held.quantity,
            });
        }

        let staged = Position {
            quantity: held.quantity - quantity,
            ..held.clone()
        };
        let tx = Transaction::new(
            symbol,
            held.average_price,
            TradeKind::Sell,
            TradeTimestamp::now(),
        );

        let position = self.commit(staged, tx)?;
        tracing::info!(
            user = %self.username,
            symbol,
            quantity,
            price = %position.average_price,
            held = position.quantity,
            "Sold"
        );
        Ok(position)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Current position in `symbol`.
    ///
    /// # Errors
    /// [`LedgerError::SymbolNotFound`] if the symbol was never bought.
    pub fn find(&self, symbol: &str) -> Result<&Position> {
        self.index
            .search(symbol)
            .ok_or_else(|| LedgerError::SymbolNotFound(symbol.to_string()))
    }

    /// Every trade, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Transaction> {
        self.tracker.full_history()
    }

    /// Cheapest trade ever recorded.
    #[must_use]
    pub fn lowest_trade(&self) -> Option<&Transaction> {
        self.tracker.lowest()
    }

    /// Most expensive trade ever recorded.
    #[must_use]
    pub fn highest_trade(&self) -> Option<&Transaction> {
        self.tracker.highest()
    }

    /// All positions, zero-quantity ones included, in ascending symbol order.
    #[must_use]
    pub fn portfolio(&self) -> Inorder<'_> {
        self.index.inorder()
    }

    // =================================================================
    // Write-through
    // =================================================================

    fn commit(&mut self, staged: Position, tx: Transaction) -> Result<Position> {
        let is_new = !self.index.contains(&staged.symbol);
        self.persist(&staged, is_new, &tx)?;

        if is_new {
            self.index.insert(staged.clone())?;
        } else {
            self.index.replace(staged.clone())?;
        }
        self.tracker.record_transaction(tx);
        Ok(staged)
    }

    /// Write both tables as they will look once `staged` and `tx` are applied.
    fn persist(&self, staged: &Position, is_new: bool, tx: &Transaction) -> Result<()> {
        let positions = self
            .index
            .preorder()
            .map(|p| if p.symbol == staged.symbol { staged } else { p })
            .chain(is_new.then_some(staged));
        self.store.save_positions(positions)?;

        let transactions = self.tracker.transactions().iter().chain(iter::once(tx));
        if let Err(e) = self.store.save_transactions(transactions) {
            // Put the positions table back in line with memory.
            if let Err(restore) = self.store.save_positions(self.index.preorder()) {
                tracing::warn!(
                    user = %self.username,
                    error = %restore,
                    "Positions table could not be restored after a failed transactions write"
                );
            }
            return Err(e);
        }
        Ok(())
    }
}

/// `held` after buying `quantity` more at `price`.
fn averaged(held: &Position, price: Decimal, quantity: u64) -> Result<Position> {
    let total = held
        .quantity
        .checked_add(quantity)
        .ok_or(LedgerError::InvalidQuantity { quantity })?;
    let cost = held
        .average_price
        .checked_mul(Decimal::from(held.quantity))
        .zip(price.checked_mul(Decimal::from(quantity)))
        .and_then(|(old, added)| old.checked_add(added))
        .ok_or(LedgerError::InvalidPrice { price })?;
    let average_price = (cost / Decimal::from(total)).round_dp(constants::AVERAGE_PRICE_DP);
    Ok(Position::new(held.symbol.clone(), average_price, total))
}
