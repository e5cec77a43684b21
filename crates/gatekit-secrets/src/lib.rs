//! Encrypted keyed token store for gatekit.
//!
//! This crate provides the secure persistence layer the gatekit SSO engine
//! stores bearer tokens in: a flat map from an opaque account id to a secret
//! string value, encrypted at rest.
//!
//! # Modules
//!
//! - [`crypto`] — AES-256-GCM seal/open and secure random bytes.
//! - [`store`] — the [`SecretStore`] trait plus the SQLite-backed and
//!   in-memory implementations.
//! - [`error`] — unified error type.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gatekit_secrets::crypto;
//! use gatekit_secrets::store::{SecretStore, SqliteSecretStore};
//!
//! # fn example() -> gatekit_secrets::error::Result<()> {
//! let key = crypto::random_bytes(crypto::KEY_LEN)?;
//! let store = SqliteSecretStore::open("data/secrets.db", &key)?;
//!
//! store.put("1f9e2c2a", "WC9zkOpA57anYEbS6vRmb3eDbac")?;
//! assert!(store.get("1f9e2c2a")?.is_some());
//! store.delete("1f9e2c2a")?;
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod error;
pub mod store;

// Re-export the most commonly used types at the crate root for convenience.
pub use error::{Result, SecretsError};
pub use store::{MemorySecretStore, SecretStore, SqliteSecretStore};
