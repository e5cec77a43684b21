//! Session persistence.
//!
//! A session is a user id plus a bearer token, resolved together from a
//! single redirect. The [`SessionStore`] keeps the two in separate places:
//! the token goes into the secure keyed store under the user id, and the
//! user id itself sits in a plain "current user" pointer slot. The pointer
//! is not secret; it only says who was last signed in.
//!
//! `store` and `reset` mutate both places; the mutex makes each call one
//! critical section so concurrent calls cannot tear the pair.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use gatekit_secrets::SecretStore;

use crate::error::{Result, SsoError};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated session.
///
/// Values handed to callers are copies; the store keeps exclusive ownership
/// of the persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The JWT `sub` claim of the identity token.
    pub user_id: String,
    /// The opaque bearer token.
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// Pointer slot
// ---------------------------------------------------------------------------

/// The plain "current user" pointer.
///
/// Either a plain file beside the secure store, or an in-memory value for
/// ephemeral sessions and tests.
#[derive(Debug)]
enum PointerSlot {
    File(PathBuf),
    Memory(Option<String>),
}

impl PointerSlot {
    fn get(&self) -> Option<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path)
                .ok()
                .map(|s| s.trim_end().to_string())
                .filter(|s| !s.is_empty()),
            Self::Memory(value) => value.clone(),
        }
    }

    fn set(&mut self, id: &str) -> std::io::Result<()> {
        match self {
            Self::File(path) => std::fs::write(path, id),
            Self::Memory(value) => {
                *value = Some(id.to_string());
                Ok(())
            }
        }
    }

    fn clear(&mut self) -> std::io::Result<()> {
        match self {
            Self::File(path) => {
                if path.exists() {
                    std::fs::remove_file(path)
                } else {
                    Ok(())
                }
            }
            Self::Memory(value) => {
                *value = None;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

struct Inner {
    pointer: PointerSlot,
    secrets: Box<dyn SecretStore>,
}

/// Persistent session state: the current-user pointer plus the secure
/// token store, mutexed into one critical section per call.
pub struct SessionStore {
    inner: Mutex<Inner>,
}

// Safety: every access to the inner state goes through the Mutex, which
// ensures only one thread touches the SecretStore at a time (the
// SQLite-backed implementation holds a `rusqlite::Connection`, which is
// `!Send`).
unsafe impl Send for SessionStore {}
unsafe impl Sync for SessionStore {}

impl SessionStore {
    /// Create a session store whose current-user pointer persists at
    /// `pointer_path`.
    pub fn new(pointer_path: impl Into<PathBuf>, secrets: Box<dyn SecretStore>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                pointer: PointerSlot::File(pointer_path.into()),
                secrets,
            }),
        }
    }

    /// Create a session store whose current-user pointer lives only in
    /// memory (tests, hosts without a data directory).
    pub fn ephemeral(secrets: Box<dyn SecretStore>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                pointer: PointerSlot::Memory(None),
                secrets,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| SsoError::Internal(format!("session store lock poisoned: {e}")))
    }

    /// Persist a session: the token into the secure store under the user
    /// id, then the user id into the plain pointer.
    ///
    /// The pointer is written only after the secure write succeeds, so a
    /// failed secure write cannot leave a pointer to a never-written entry.
    ///
    /// # Errors
    ///
    /// Returns [`SsoError::Secrets`] if the secure write fails, or
    /// [`SsoError::Io`] if the pointer write fails afterwards (the secure
    /// entry then exists without a pointer; a later `store` or `reset`
    /// repairs it).
    pub fn store(&self, user_id: &str, access_token: &str) -> Result<()> {
        let mut inner = self.lock()?;

        inner.secrets.put(user_id, access_token)?;
        inner.pointer.set(user_id)?;

        tracing::info!(user_id = user_id, "session stored");
        Ok(())
    }

    /// The bearer token of the current session, if any.
    ///
    /// `None` when no user is pointed at, when the secure entry is missing,
    /// when the stored value is the empty-string "signed out" sentinel, or
    /// when the secure store fails (a failure here degrades to "logged
    /// out" rather than propagating).
    pub fn current_token(&self) -> Option<String> {
        let inner = self.lock().ok()?;
        let id = inner.pointer.get()?;

        match inner.secrets.get(&id) {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %id, "token lookup failed");
                None
            }
        }
    }

    /// The current user id, verbatim from the plain pointer.
    ///
    /// This can be `Some` while [`current_token`](Self::current_token) is
    /// `None`, e.g. after a partially failed reset. Callers must tolerate
    /// the inconsistency.
    pub fn current_user_id(&self) -> Option<String> {
        let inner = self.lock().ok()?;
        inner.pointer.get()
    }

    /// The full current session, if both the pointer and a non-empty token
    /// resolve.
    pub fn current_session(&self) -> Option<Session> {
        let user_id = self.current_user_id()?;
        let access_token = self.current_token()?;
        Some(Session {
            user_id,
            access_token,
        })
    }

    /// Tear down the current session: delete the secure entry for the
    /// pointed-at user, then clear the pointer.
    ///
    /// Failures are reported to the fault channel, not returned: if the
    /// secure deletion fails the pointer is not cleared, so the next
    /// reset retries the delete.
    pub fn reset(&self) {
        let Ok(mut inner) = self.lock() else {
            tracing::error!("session store lock poisoned during reset");
            return;
        };

        let Some(id) = inner.pointer.get() else {
            return;
        };

        match inner.secrets.delete(&id) {
            Ok(()) => {
                if let Err(e) = inner.pointer.clear() {
                    tracing::error!(error = %e, "failed to clear current-user pointer");
                }
                tracing::info!(user_id = %id, "session reset");
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %id, "failed to delete stored token");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
