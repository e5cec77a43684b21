//! Integration tests for the gatekit-secrets crate.
//!
//! These tests exercise the on-disk store lifecycle: persistence across
//! reopen, key mismatch behavior, and overwrite semantics.

use gatekit_secrets::crypto;
use gatekit_secrets::store::{SecretStore, SqliteSecretStore};

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("secrets.db");
    let key = crypto::random_bytes(crypto::KEY_LEN).unwrap();

    {
        let store = SqliteSecretStore::open(&db, &key).unwrap();
        store.put("user-1", "tok-persisted").unwrap();
    }

    let reopened = SqliteSecretStore::open(&db, &key).unwrap();
    assert_eq!(
        reopened.get("user-1").unwrap().as_deref(),
        Some("tok-persisted")
    );
}

#[test]
fn wrong_key_cannot_read_values() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("secrets.db");
    let key = crypto::random_bytes(crypto::KEY_LEN).unwrap();

    {
        let store = SqliteSecretStore::open(&db, &key).unwrap();
        store.put("user-1", "tok-secret").unwrap();
    }

    let other_key = crypto::random_bytes(crypto::KEY_LEN).unwrap();
    let reopened = SqliteSecretStore::open(&db, &other_key).unwrap();

    // The row exists but the value cannot be authenticated with this key.
    assert!(reopened.get("user-1").is_err());
}

#[test]
fn overwrite_then_delete_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("secrets.db");
    let key = crypto::random_bytes(crypto::KEY_LEN).unwrap();

    let store = SqliteSecretStore::open(&db, &key).unwrap();

    store.put("user-1", "first").unwrap();
    store.put("user-1", "second").unwrap();
    assert_eq!(store.get("user-1").unwrap().as_deref(), Some("second"));

    store.delete("user-1").unwrap();
    assert!(store.get("user-1").unwrap().is_none());

    // Deleting again stays a no-op.
    store.delete("user-1").unwrap();
}

#[test]
fn accounts_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("secrets.db");
    let key = crypto::random_bytes(crypto::KEY_LEN).unwrap();

    let store = SqliteSecretStore::open(&db, &key).unwrap();

    store.put("alice", "tok-a").unwrap();
    store.put("bob", "tok-b").unwrap();
    store.delete("alice").unwrap();

    assert!(store.get("alice").unwrap().is_none());
    assert_eq!(store.get("bob").unwrap().as_deref(), Some("tok-b"));
}
