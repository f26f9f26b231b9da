//! A user's two tables bound to their files on disk.

use stockledger_types::{LedgerConfig, Position, Result, Transaction, UserFiles};

use crate::tables::{
    self, POSITIONS_TABLE, TRANSACTIONS_TABLE, open_if_exists, write_atomically,
};

/// File-backed positions and transactions tables for one user.
#[derive(Debug, Clone)]
pub struct CsvStore {
    files: UserFiles,
}

impl CsvStore {
    #[must_use]
    pub fn new(files: UserFiles) -> Self {
        Self { files }
    }

    /// Resolve `username`'s tables under the configured data directory.
    pub fn for_user(config: &LedgerConfig, username: &str) -> Result<Self> {
        Ok(Self::new(UserFiles::resolve(config, username)?))
    }

    #[must_use]
    pub fn files(&self) -> &UserFiles {
        &self.files
    }

    /// All stored positions; empty if the table does not exist yet.
    pub fn load_positions(&self) -> Result<Vec<Position>> {
        match open_if_exists(&self.files.positions)? {
            Some(file) => tables::read_positions(file),
            None => {
                tracing::debug!(
                    table = POSITIONS_TABLE,
                    path = %self.files.positions.display(),
                    "No table yet"
                );
                Ok(Vec::new())
            }
        }
    }

    /// All stored transactions in file order; empty if the table does not exist yet.
    pub fn load_transactions(&self) -> Result<Vec<Transaction>> {
        match open_if_exists(&self.files.transactions)? {
            Some(file) => tables::read_transactions(file),
            None => {
                tracing::debug!(
                    table = TRANSACTIONS_TABLE,
                    path = %self.files.transactions.display(),
                    "No table yet"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the positions table with `rows`.
    pub fn save_positions<'a>(&self, rows: impl IntoIterator<Item = &'a Position>) -> Result<()> {
        write_atomically(&self.files.positions, |file| {
            tables::write_positions(file, rows)
        })
    }

    /// Replace the transactions table with `rows`.
    pub fn save_transactions<'a>(
        &self,
        rows: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<()> {
        write_atomically(&self.files.transactions, |file| {
            tables::write_transactions(file, rows)
        })
    }
}
