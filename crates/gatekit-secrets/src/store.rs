//! Keyed secret storage.
//!
//! The [`SecretStore`] trait is the seam consumers program against: a flat
//! map from an opaque account id to a secret string value. Two
//! implementations ship with this crate:
//!
//! - [`SqliteSecretStore`] — the production store. Values are encrypted with
//!   AES-256-GCM before they reach SQLite; the account id column stays in
//!   the clear so lookups need no decryption.
//! - [`MemorySecretStore`] — an unencrypted in-process map for tests and
//!   ephemeral sessions.
//!
//! Deleting an absent account is a no-op for both implementations, so
//! callers can retry a partially failed teardown without special-casing.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::crypto;
use crate::error::{Result, SecretsError};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A keyed store for secret string values.
///
/// Accounts are opaque ids chosen by the caller; values are treated as
/// secret material by the implementation.
pub trait SecretStore {
    /// Store (or overwrite) the value for `account`.
    fn put(&self, account: &str, value: &str) -> Result<()>;

    /// Retrieve the value for `account`, or `None` if absent.
    fn get(&self, account: &str) -> Result<Option<String>>;

    /// Delete the value for `account`. Absent accounts are not an error.
    fn delete(&self, account: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SQLite-backed store
// ---------------------------------------------------------------------------

/// Encrypted secret store backed by SQLite.
///
/// # Example
///
/// ```rust,no_run
/// # use gatekit_secrets::store::{SecretStore, SqliteSecretStore};
/// # use gatekit_secrets::crypto;
/// # fn example() -> gatekit_secrets::error::Result<()> {
/// let key = crypto::random_bytes(crypto::KEY_LEN)?;
/// let store = SqliteSecretStore::open("data/secrets.db", &key)?;
///
/// store.put("1f9e...", "WC9zkOpA57anYEbS6vRmb3eDbac")?;
/// let token = store.get("1f9e...")?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteSecretStore {
    conn: Connection,
    master_key: Vec<u8>,
}

impl SqliteSecretStore {
    /// Open (or create) a secret database at `path` with the given
    /// `master_key`. Runs schema migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Database`] if the database cannot be opened,
    /// or [`SecretsError::MigrationFailed`] if schema setup fails.
    pub fn open(path: impl AsRef<std::path::Path>, master_key: &[u8]) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening secret store database");

        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;

        let store = Self {
            conn,
            master_key: master_key.to_vec(),
        };

        store.run_migrations()?;

        tracing::info!("secret store ready");
        Ok(store)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory(master_key: &[u8]) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_connection(&conn)?;

        let store = Self {
            conn,
            master_key: master_key.to_vec(),
        };

        store.run_migrations()?;
        Ok(store)
    }

    /// Configure SQLite pragmas for performance and safety.
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    /// Run database schema migrations.
    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS secrets (
                account    TEXT PRIMARY KEY,
                value      BLOB NOT NULL,
                nonce      BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );",
            )
            .map_err(|e| SecretsError::MigrationFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

impl SecretStore for SqliteSecretStore {
    fn put(&self, account: &str, value: &str) -> Result<()> {
        let (nonce, ciphertext) = crypto::seal(value.as_bytes(), &self.master_key)?;
        let now = Utc::now().timestamp();

        self.conn.execute(
            "INSERT INTO secrets (account, value, nonce, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(account) DO UPDATE SET
                 value = excluded.value,
                 nonce = excluded.nonce,
                 updated_at = excluded.updated_at",
            params![account, ciphertext, nonce.as_slice(), now],
        )?;

        tracing::debug!(account = account, "stored secret");
        Ok(())
    }

    fn get(&self, account: &str) -> Result<Option<String>> {
        let row = self
            .conn
            .query_row(
                "SELECT value, nonce FROM secrets WHERE account = ?1",
                params![account],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                    ))
                },
            )
            .optional()?;

        let Some((ciphertext, nonce_bytes)) = row else {
            return Ok(None);
        };

        let mut nonce = [0u8; crypto::NONCE_LEN_BYTES];
        if nonce_bytes.len() != crypto::NONCE_LEN_BYTES {
            return Err(SecretsError::ValueCorrupted {
                account: account.to_string(),
            });
        }
        nonce.copy_from_slice(&nonce_bytes);

        let plaintext = crypto::open(&nonce, &ciphertext, &self.master_key)?;
        let value = String::from_utf8(plaintext).map_err(|_| SecretsError::ValueCorrupted {
            account: account.to_string(),
        })?;

        Ok(Some(value))
    }

    fn delete(&self, account: &str) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM secrets WHERE account = ?1", params![account])?;

        if rows == 0 {
            tracing::debug!(account = account, "delete for absent account, no-op");
        } else {
            tracing::debug!(account = account, "deleted secret");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Unencrypted in-process secret store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| SecretsError::Internal(format!("store lock poisoned: {e}")))
    }
}

impl SecretStore for MemorySecretStore {
    fn put(&self, account: &str, value: &str) -> Result<()> {
        self.lock()?
            .insert(account.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, account: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(account).cloned())
    }

    fn delete(&self, account: &str) -> Result<()> {
        self.lock()?.remove(account);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteSecretStore {
        let key = crypto::random_bytes(crypto::KEY_LEN).unwrap();
        SqliteSecretStore::open_in_memory(&key).unwrap()
    }

    #[test]
    fn put_get_roundtrip() {
        let store = test_store();
        store.put("user-1", "tok-abc").unwrap();

        let value = store.get("user-1").unwrap();
        assert_eq!(value.as_deref(), Some("tok-abc"));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = test_store();
        assert!(store.get("nobody").unwrap().is_none());
    }

    #[test]
    fn put_overwrites_existing() {
        let store = test_store();
        store.put("user-1", "first").unwrap();
        store.put("user-1", "second").unwrap();

        assert_eq!(store.get("user-1").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn delete_removes_value() {
        let store = test_store();
        store.put("user-1", "tok").unwrap();
        store.delete("user-1").unwrap();

        assert!(store.get("user-1").unwrap().is_none());
    }

    #[test]
    fn delete_absent_account_is_noop() {
        let store = test_store();
        store.delete("nobody").unwrap();
        store.delete("nobody").unwrap();
    }

    #[test]
    fn empty_string_value_roundtrip() {
        // The empty string is a meaningful sentinel for callers; it must
        // survive storage byte-for-byte.
        let store = test_store();
        store.put("user-1", "").unwrap();

        assert_eq!(store.get("user-1").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn value_is_not_stored_in_plaintext() {
        let store = test_store();
        store.put("user-1", "super-secret-token").unwrap();

        let raw: Vec<u8> = store
            .conn
            .query_row(
                "SELECT value FROM secrets WHERE account = 'user-1'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        let needle = b"super-secret-token";
        assert!(!raw.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemorySecretStore::new();
        store.put("user-1", "tok").unwrap();
        assert_eq!(store.get("user-1").unwrap().as_deref(), Some("tok"));

        store.delete("user-1").unwrap();
        assert!(store.get("user-1").unwrap().is_none());
        store.delete("user-1").unwrap();
    }
}
