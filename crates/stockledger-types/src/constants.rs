//! System-wide constants for the StockLedger workspace.

/// Decimal places kept on a position's weighted average price.
pub const AVERAGE_PRICE_DP: u32 = 2;

/// `chrono` format used for auto-generated trade timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row of the per-user positions table.
pub const POSITIONS_HEADER: [&str; 3] = ["Symbol", "Price", "Quantity"];

/// Header row of the per-user transactions table.
pub const TRANSACTIONS_HEADER: [&str; 4] = ["Stock Name", "Price", "Type", "Timestamp"];

/// Default credentials table (headerless `username,secret` rows).
pub const DEFAULT_CREDENTIALS_FILE: &str = "users.csv";

/// Default suffix appended to the username for the positions table.
pub const DEFAULT_POSITIONS_SUFFIX: &str = "_stocks.csv";

/// Default suffix appended to the username for the transactions table.
pub const DEFAULT_TRANSACTIONS_SUFFIX: &str = "_transactions.csv";

/// Default suffix appended to the username for the session lock file.
pub const DEFAULT_LOCK_SUFFIX: &str = ".lock";

/// Suffix of the scratch file a table is written to before being renamed
/// over the real one.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Tag that marks a salted-hash credential secret.
pub const CREDENTIAL_SCHEME: &str = "sha256";

/// Random salt length for credential hashing, in bytes.
pub const SALT_LEN: usize = 16;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
