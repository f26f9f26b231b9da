//! Error types for the StockLedger workspace.
//!
//! All errors use the `SL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Lookup errors
//! - 3xx: Holdings errors
//! - 4xx: Credential errors
//! - 5xx: Session errors
//! - 9xx: General / storage errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Central error enum for all StockLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// Trade price was negative.
    #[error("SL_ERR_100: Invalid price: {price} (must be >= 0)")]
    InvalidPrice { price: Decimal },

    /// Trade quantity was zero.
    #[error("SL_ERR_101: Invalid quantity: {quantity} (must be >= 1)")]
    InvalidQuantity { quantity: u64 },

    /// Symbol was empty or otherwise unusable as a key.
    #[error("SL_ERR_102: Invalid symbol: {reason}")]
    InvalidSymbol { reason: String },

    /// Username cannot be used as a credential key or a file name.
    #[error("SL_ERR_103: Invalid username: {reason}")]
    InvalidUsername { reason: String },

    /// Password was rejected before hashing.
    #[error("SL_ERR_104: Invalid password: {reason}")]
    InvalidPassword { reason: String },

    // =================================================================
    // Lookup Errors (2xx)
    // =================================================================
    /// No position is held under this symbol.
    #[error("SL_ERR_200: Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The index already holds a position under this symbol.
    #[error("SL_ERR_201: Symbol already indexed: {0}")]
    DuplicateSymbol(String),

    // =================================================================
    // Holdings Errors (3xx)
    // =================================================================
    /// A sell asked for more shares than are held.
    #[error("SL_ERR_300: Insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientQuantity {
        symbol: String,
        requested: u64,
        held: u64,
    },

    // =================================================================
    // Credential Errors (4xx)
    // =================================================================
    /// Registration with a username that is already taken.
    #[error("SL_ERR_400: Username already exists: {0}")]
    DuplicateUser(String),

    /// Unknown user or wrong password.
    #[error("SL_ERR_401: Invalid username or password")]
    AuthenticationFailed,

    // =================================================================
    // Session Errors (5xx)
    // =================================================================
    /// Another session already holds this user's ledger.
    #[error("SL_ERR_500: Session already active for user {username}")]
    SessionBusy { username: String },

    // =================================================================
    // General / Storage (9xx)
    // =================================================================
    /// A persisted table could not be parsed.
    #[error("SL_ERR_900: Corrupt table {table} at row {row}: {reason}")]
    CorruptTable {
        table: String,
        row: usize,
        reason: String,
    },

    /// Configuration error (invalid config file, bad field values, etc.).
    #[error("SL_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// I/O error while reading or writing a table.
    #[error("SL_ERR_902: I/O error: {0}")]
    Io(String),

    /// Unrecoverable internal error.
    #[error("SL_ERR_903: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl LedgerError {
    /// Whether the failure was caused by caller input rather than storage.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrice { .. }
                | Self::InvalidQuantity { .. }
                | Self::InvalidSymbol { .. }
                | Self::InvalidUsername { .. }
                | Self::InvalidPassword { .. }
                | Self::SymbolNotFound(_)
                | Self::InsufficientQuantity { .. }
                | Self::DuplicateUser(_)
                | Self::AuthenticationFailed
        )
    }
}
