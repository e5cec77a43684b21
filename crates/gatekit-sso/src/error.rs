//! Error types for the SSO engine crate.
//!
//! All engine operations surface errors through [`SsoError`], the single
//! error type for this crate. No failure inside the navigation/token
//! pipeline escapes as a panic; everything degrades to a session verdict
//! (see the classifier) or a typed error at the API boundary.

/// Unified error type for the gatekit SSO engine.
#[derive(Debug, thiserror::Error)]
pub enum SsoError {
    /// Configuration is missing or malformed; the caller can retry with a
    /// fixed configuration.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// An assembled URL failed validation. Configuration-class: well-formed
    /// config never produces this.
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A compact JWT could not be decoded. Callers treat this the same as
    /// "claim absent".
    #[error("token decode failed: {reason}")]
    TokenDecode {
        /// Why the token did not decode.
        reason: String,
    },

    /// An error propagated from the secret store.
    #[error("secret store error: {0}")]
    Secrets(#[from] gatekit_secrets::SecretsError),

    /// I/O error (e.g. the plain current-user pointer file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for unexpected internal errors (e.g. a poisoned lock).
    #[error("internal sso error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, SsoError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
