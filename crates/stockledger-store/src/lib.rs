//! # stockledger-store
//!
//! **Disk plane**: everything in StockLedger that reads or writes a file.
//!
//! ## Tables
//!
//! Each user owns two headered CSV tables:
//! - positions: `Symbol,Price,Quantity`
//! - transactions: `Stock Name,Price,Type,Timestamp`
//!
//! Rows are parsed strictly by position. A missing table means "no state
//! yet", never an error. Every save replaces the whole table atomically
//! (scratch file + rename).
//!
//! ## Credentials
//!
//! A headerless two-column `username,secret` table. Secrets are salted
//! SHA-256 digests; plaintext secrets from older stores are still accepted
//! and upgraded on first successful login.
//!
//! ## Session locks
//!
//! One lock file per user makes the single-writer rule explicit: a second
//! session for the same user fails fast instead of racing the first.

pub mod credentials;
pub mod csv_store;
pub mod session_lock;
pub mod tables;

pub use credentials::{AuthenticatedUser, CredentialStore};
pub use csv_store::CsvStore;
pub use session_lock::SessionLock;
pub use tables::{read_positions, read_transactions, write_positions, write_transactions};
