//! AES-256-GCM encryption for stored tokens, built on the `ring` crate.
//!
//! Every value written by the SQLite-backed store is sealed with a fresh
//! random 96-bit nonce before it reaches disk. The nonce travels next to the
//! ciphertext; the 256-bit key stays with the caller.

use ring::aead::{self, Aad, BoundKey, NONCE_LEN, Nonce, NonceSequence, SealingKey, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Result, SecretsError};

/// Length of the AES-256-GCM key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN_BYTES: usize = NONCE_LEN;

/// AES-256-GCM algorithm from `ring`.
static AEAD_ALG: &aead::Algorithm = &aead::AES_256_GCM;

// ---------------------------------------------------------------------------
// Nonce handling
// ---------------------------------------------------------------------------

/// A single-use nonce sequence that yields exactly one nonce and then errors.
///
/// `ring` requires a [`NonceSequence`] for sealing operations. Each sealing
/// key here is constructed for one operation with one fresh random nonce.
struct SingleNonce(Option<[u8; NONCE_LEN_BYTES]>);

impl SingleNonce {
    fn new(bytes: [u8; NONCE_LEN_BYTES]) -> Self {
        Self(Some(bytes))
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.0
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` with AES-256-GCM under the given 256-bit `key`.
///
/// Returns `(nonce, ciphertext)`; the ciphertext includes the 128-bit
/// authentication tag appended by `ring`.
///
/// # Errors
///
/// Returns [`SecretsError::EncryptionFailed`] if the key length is wrong or
/// `ring` reports a failure.
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<([u8; NONCE_LEN_BYTES], Vec<u8>)> {
    if key.len() != KEY_LEN {
        return Err(SecretsError::EncryptionFailed {
            reason: format!("key must be {} bytes, got {}", KEY_LEN, key.len()),
        });
    }

    let rng = SystemRandom::new();

    let mut nonce_bytes = [0u8; NONCE_LEN_BYTES];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| SecretsError::EncryptionFailed {
            reason: "failed to generate random nonce".into(),
        })?;

    let unbound_key =
        UnboundKey::new(AEAD_ALG, key).map_err(|_| SecretsError::EncryptionFailed {
            reason: "failed to create AES-256-GCM key".into(),
        })?;

    let mut sealing_key = SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

    // `ring` encrypts in-place and appends the authentication tag.
    let mut in_out = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(Aad::empty(), &mut in_out)
        .map_err(|_| SecretsError::EncryptionFailed {
            reason: "seal_in_place failed".into(),
        })?;

    Ok((nonce_bytes, in_out))
}

/// Decrypt `ciphertext` (including the GCM tag) with the given `nonce` and
/// 256-bit `key`, returning the plaintext.
///
/// # Errors
///
/// Returns [`SecretsError::DecryptionFailed`] if the key is wrong, the
/// ciphertext has been tampered with, or the nonce does not match.
pub fn open(nonce: &[u8; NONCE_LEN_BYTES], ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != KEY_LEN {
        return Err(SecretsError::DecryptionFailed {
            reason: format!("key must be {} bytes, got {}", KEY_LEN, key.len()),
        });
    }

    let unbound_key =
        UnboundKey::new(AEAD_ALG, key).map_err(|_| SecretsError::DecryptionFailed {
            reason: "failed to create AES-256-GCM key".into(),
        })?;

    let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(*nonce));

    let mut in_out = ciphertext.to_vec();
    let plaintext = opening_key
        .open_in_place(Aad::empty(), &mut in_out)
        .map_err(|_| SecretsError::DecryptionFailed {
            reason: "authentication failed — wrong key or corrupted data".into(),
        })?;

    Ok(plaintext.to_vec())
}

// ---------------------------------------------------------------------------
// Random bytes
// ---------------------------------------------------------------------------

/// Generate `len` cryptographically secure random bytes.
///
/// # Errors
///
/// Returns [`SecretsError::Internal`] if the system CSPRNG fails.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| SecretsError::Internal("failed to generate random bytes".into()))?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
