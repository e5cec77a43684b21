//! Error types for the secret store crate.
//!
//! All secret store operations surface errors through [`SecretsError`],
//! the single error type for this crate.

/// Unified error type for the gatekit secret store.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    // -- Crypto errors ------------------------------------------------------
    /// Encryption failed (e.g. invalid key length, ring internal error).
    #[error("encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// Decryption failed (e.g. wrong key, corrupted ciphertext, bad nonce).
    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    // -- Store errors -------------------------------------------------------
    /// Database schema migration failed.
    #[error("migration failed: {reason}")]
    MigrationFailed { reason: String },

    /// A stored value could not be interpreted after decryption.
    #[error("stored value corrupted for account {account}")]
    ValueCorrupted { account: String },

    // -- Underlying errors --------------------------------------------------
    /// SQLite error from `rusqlite`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error from the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // -- Generic ------------------------------------------------------------
    /// Catch-all for unexpected internal errors. Prefer a typed variant
    /// whenever possible.
    #[error("internal secret store error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, SecretsError>;
