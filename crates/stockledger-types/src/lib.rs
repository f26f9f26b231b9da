//! # stockledger-types
//!
//! Shared types, errors, and configuration for the **StockLedger** workspace.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Holdings**: [`Position`]
//! - **Trade log**: [`Transaction`], [`TradeKind`], [`TradeTimestamp`]
//! - **Configuration**: [`LedgerConfig`], [`UserFiles`]
//! - **Errors**: [`LedgerError`] with `SL_ERR_` prefix codes
//! - **Constants**: table headers, file defaults, rounding and hashing parameters

pub mod config;
pub mod constants;
pub mod error;
pub mod position;
pub mod transaction;

pub use config::*;
pub use error::*;
pub use position::*;
pub use transaction::*;

// Constants are accessed via `stockledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
