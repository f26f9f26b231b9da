//! Configuration for where a ledger keeps its tables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result, constants};

/// Storage layout shared by the credential store and every user's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory holding the credentials table and all per-user tables.
    pub data_dir: PathBuf,
    /// File name of the credentials table inside `data_dir`.
    pub credentials_file: String,
    /// Appended to the username to name the positions table.
    pub positions_suffix: String,
    /// Appended to the username to name the transactions table.
    pub transactions_suffix: String,
    /// Appended to the username to name the session lock file.
    pub lock_suffix: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            credentials_file: constants::DEFAULT_CREDENTIALS_FILE.to_string(),
            positions_suffix: constants::DEFAULT_POSITIONS_SUFFIX.to_string(),
            transactions_suffix: constants::DEFAULT_TRANSACTIONS_SUFFIX.to_string(),
            lock_suffix: constants::DEFAULT_LOCK_SUFFIX.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Default layout rooted at `data_dir`.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::Configuration(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Full path of the credentials table.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(&self.credentials_file)
    }

    fn validate(&self) -> Result<()> {
        if self.credentials_file.is_empty() {
            return Err(LedgerError::Configuration(
                "credentials_file must not be empty".into(),
            ));
        }
        let suffixes = [
            ("positions_suffix", &self.positions_suffix),
            ("transactions_suffix", &self.transactions_suffix),
            ("lock_suffix", &self.lock_suffix),
        ];
        for (name, suffix) in suffixes {
            if suffix.is_empty() {
                return Err(LedgerError::Configuration(format!("{name} must not be empty")));
            }
            if suffix.contains(['/', '\\']) {
                return Err(LedgerError::Configuration(format!(
                    "{name} must not contain path separators"
                )));
            }
        }
        if self.positions_suffix == self.transactions_suffix
            || self.positions_suffix == self.lock_suffix
            || self.transactions_suffix == self.lock_suffix
        {
            return Err(LedgerError::Configuration(
                "per-user file suffixes must be distinct".into(),
            ));
        }
        Ok(())
    }
}

/// The per-user files derived from a [`LedgerConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFiles {
    pub positions: PathBuf,
    pub transactions: PathBuf,
    pub lock: PathBuf,
}

impl UserFiles {
    /// Resolve the files of `username` under the configured data directory.
    pub fn resolve(config: &LedgerConfig, username: &str) -> Result<Self> {
        validate_username(username)?;
        let file = |suffix: &str| config.data_dir.join(format!("{username}{suffix}"));
        Ok(Self {
            positions: file(&config.positions_suffix),
            transactions: file(&config.transactions_suffix),
            lock: file(&config.lock_suffix),
        })
    }
}

/// Usernames double as file name prefixes, so they must be plain names.
pub fn validate_username(username: &str) -> Result<()> {
    let reason = if username.is_empty() {
        Some("username is empty")
    } else if username.contains(['/', '\\']) {
        Some("username contains a path separator")
    } else if username.contains("..") {
        Some("username contains '..'")
    } else if username.chars().any(char::is_control) {
        Some("username contains control characters")
    } else if username.contains(',') {
        Some("username contains ','")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(LedgerError::InvalidUsername {
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
