//! # stockledger-index
//!
//! **Pure in-memory structures behind a user's ledger.**
//!
//! - **Zero side effects**: no file I/O, no clocks, no credentials
//! - **[`PriceIndex`]**: AVL tree keyed by symbol, one [`Position`] per symbol
//! - **[`BinaryHeap`]**: min- or max-ordered priority container
//! - **[`ExtremesTracker`]**: append-only trade log plus two heaps exposing the
//!   lowest and highest trade price ever recorded
//!
//! [`Position`]: stockledger_types::Position

pub mod extremes;
pub mod heap;
pub mod price_index;

pub use extremes::ExtremesTracker;
pub use heap::{BinaryHeap, HeapMode};
pub use price_index::{Inorder, Preorder, PriceIndex};
