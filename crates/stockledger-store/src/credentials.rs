//! Username/password oracle backed by a headerless two-column table.
//!
//! Secrets are stored as `$sha256$<salt hex>$<digest hex>` where the digest
//! is `SHA-256(salt ‖ password)` over a random 16-byte salt. A secret without
//! the `$sha256$` tag is a plaintext password written by an older store; it
//! is still accepted and is rehashed on the first successful login.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use stockledger_types::{LedgerError, Result, constants, validate_username};

use crate::tables::{csv_error, open_if_exists, table_reader, write_atomically};

const CREDENTIALS_TABLE: &str = "credentials";

/// Proof that a login succeeded.
///
/// Only [`CredentialStore::login`] can mint one; a ledger is opened for the
/// user it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    username: String,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Registered users and their secrets, written through on every change.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    users: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Load the table at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut users = BTreeMap::new();

        if let Some(file) = open_if_exists(&path)? {
            let mut rdr = table_reader(file);
            for (idx, record) in rdr.records().enumerate() {
                let record = record.map_err(|e| csv_error(CREDENTIALS_TABLE, &e))?;
                if record.len() < 2 {
                    tracing::warn!(
                        table = CREDENTIALS_TABLE,
                        row = idx + 1,
                        "Skipping malformed row"
                    );
                    continue;
                }
                users.insert(record[0].to_string(), record[1].to_string());
            }
        }

        tracing::debug!(path = %path.display(), users = users.len(), "Credential store opened");
        Ok(Self { path, users })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a new user.
    ///
    /// # Errors
    /// [`LedgerError::DuplicateUser`] if the name is taken, a validation
    /// error for an unusable name or empty password, or an I/O error if the
    /// table cannot be written (the user is then not registered).
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        validate_username(username)?;
        if password.is_empty() {
            return Err(LedgerError::InvalidPassword {
                reason: "password is empty".into(),
            });
        }
        if self.users.contains_key(username) {
            return Err(LedgerError::DuplicateUser(username.to_string()));
        }

        self.users
            .insert(username.to_string(), hash_secret(password));
        if let Err(e) = self.save() {
            self.users.remove(username);
            return Err(e);
        }
        tracing::info!(user = username, "User registered");
        Ok(())
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    /// [`LedgerError::AuthenticationFailed`] for an unknown user or a wrong
    /// password; the two cases are deliberately indistinguishable.
    pub fn login(&mut self, username: &str, password: &str) -> Result<AuthenticatedUser> {
        let Some(secret) = self.users.get(username) else {
            tracing::warn!(user = username, "Login failed");
            return Err(LedgerError::AuthenticationFailed);
        };

        let verdict = verify_secret(secret, password);
        if verdict == Verdict::Mismatch {
            tracing::warn!(user = username, "Login failed");
            return Err(LedgerError::AuthenticationFailed);
        }
        if verdict == Verdict::LegacyMatch {
            self.upgrade_legacy(username, password);
        }

        tracing::info!(user = username, "Login succeeded");
        Ok(AuthenticatedUser {
            username: username.to_string(),
        })
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Replace a plaintext secret with its salted hash. Failure to persist
    /// leaves the plaintext in place; the login itself still succeeds.
    fn upgrade_legacy(&mut self, username: &str, password: &str) {
        let hashed = hash_secret(password);
        let Some(previous) = self.users.insert(username.to_string(), hashed) else {
            return;
        };
        match self.save() {
            Ok(()) => tracing::info!(user = username, "Plaintext secret upgraded to salted hash"),
            Err(e) => {
                tracing::warn!(user = username, error = %e, "Could not persist upgraded secret");
                self.users.insert(username.to_string(), previous);
            }
        }
    }

    fn save(&self) -> Result<()> {
        write_atomically(&self.path, |file| {
            let mut wtr = csv::Writer::from_writer(file);
            for (username, secret) in &self.users {
                wtr.write_record([username.as_str(), secret.as_str()])
                    .map_err(|e| csv_error(CREDENTIALS_TABLE, &e))?;
            }
            wtr.flush()?;
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Match,
    LegacyMatch,
    Mismatch,
}

fn scheme_prefix() -> String {
    format!("${}$", constants::CREDENTIAL_SCHEME)
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn hash_secret(password: &str) -> String {
    let salt: [u8; constants::SALT_LEN] = rand::random();
    format!(
        "{}{}${}",
        scheme_prefix(),
        hex::encode(salt),
        hex::encode(digest(&salt, password))
    )
}

fn verify_secret(secret: &str, password: &str) -> Verdict {
    let Some(encoded) = secret.strip_prefix(&scheme_prefix()) else {
        return if constant_time_eq(secret.as_bytes(), password.as_bytes()) {
            Verdict::LegacyMatch
        } else {
            Verdict::Mismatch
        };
    };

    let decoded = encoded
        .split_once('$')
        .and_then(|(salt, hash)| Some((hex::decode(salt).ok()?, hex::decode(hash).ok()?)));
    match decoded {
        Some((salt, expected)) if constant_time_eq(&digest(&salt, password), &expected) => {
            Verdict::Match
        }
        Some(_) => Verdict::Mismatch,
        None => {
            tracing::warn!("Malformed hashed secret in credential store");
            Verdict::Mismatch
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
