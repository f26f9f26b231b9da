//! Per-user session lock: one live ledger per user.
//!
//! The lock is a file created with create-new semantics, so a second
//! session for the same user fails with [`LedgerError::SessionBusy`]
//! instead of interleaving writes with the first. The file is removed when
//! the lock is dropped. A process that dies without dropping it leaves the
//! file behind; it records the owner's pid for whoever clears it by hand.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use stockledger_types::{LedgerError, Result, TradeTimestamp, UserFiles};

/// Exclusive claim on one user's tables for the lifetime of a session.
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
    username: String,
}

impl SessionLock {
    /// Claim `username`'s tables.
    ///
    /// # Errors
    /// [`LedgerError::SessionBusy`] if another session holds the lock.
    pub fn acquire(files: &UserFiles, username: &str) -> Result<Self> {
        if let Some(parent) = files.lock.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&files.lock)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::warn!(user = username, lock = %files.lock.display(), "Session already active");
                return Err(LedgerError::SessionBusy {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let lock = Self {
            path: files.lock.clone(),
            username: username.to_string(),
        };
        // On failure `lock` drops here and removes the half-written file.
        writeln!(
            file,
            "pid={} acquired={}",
            std::process::id(),
            TradeTimestamp::now()
        )?;
        tracing::debug!(user = username, lock = %lock.path.display(), "Session lock acquired");
        Ok(lock)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(user = %self.username, "Session lock released"),
            Err(e) => tracing::warn!(
                user = %self.username,
                lock = %self.path.display(),
                error = %e,
                "Could not remove session lock"
            ),
        }
    }
}
