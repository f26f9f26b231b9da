//! # stockledger-ledger
//!
//! **A user's securities ledger.**
//!
//! [`Ledger`] composes a [`PriceIndex`] of current positions with an
//! [`ExtremesTracker`] over every trade, hydrated from the user's tables when
//! the session opens and written through to them on every buy or sell.
//!
//! ## Lifecycle
//!
//! 1. Authenticate with a [`CredentialStore`] to obtain an [`AuthenticatedUser`]
//! 2. [`Ledger::open`] claims the user's session lock and loads both tables
//! 3. `buy` / `sell` stage the change, persist it, then commit it in memory
//! 4. Dropping the ledger ends the session and releases the lock
//!
//! The public surface a front-end may call is `buy`, `sell`, `find`,
//! `history`, `lowest_trade`, `highest_trade` and `portfolio`.
//!
//! [`PriceIndex`]: stockledger_index::PriceIndex
//! [`ExtremesTracker`]: stockledger_index::ExtremesTracker
//! [`CredentialStore`]: stockledger_store::CredentialStore
//! [`AuthenticatedUser`]: stockledger_store::AuthenticatedUser

pub mod ledger;

pub use ledger::Ledger;
