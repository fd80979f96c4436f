use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use salama_store::TransactionStore;
use salama_types::{Transaction, TransactionId, TransactionStatus};
use std::fs;
use tempfile::TempDir;

fn store() -> (TempDir, TransactionStore) {
    let dir = TempDir::new().unwrap();
    let store = TransactionStore::open(dir.path()).unwrap();
    (dir, store)
}

fn sample_transaction() -> Transaction {
    Transaction::new(TransactionId::new("TXN-42"), Some("ws_CO_99".into()))
}

#[test]
fn save_then_load_roundtrips() {
    let (_dir, store) = store();
    let txn = sample_transaction();

    store.save(&txn).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, txn);
}

#[test]
fn load_on_empty_store_is_none() {
    let (_dir, store) = store();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_overwrites_the_single_slot() {
    let (_dir, store) = store();
    store.save(&sample_transaction()).unwrap();

    let mut newer = Transaction::new(TransactionId::new("TXN-43"), None);
    newer.status = TransactionStatus::Processing;
    store.save(&newer).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.transaction_id, TransactionId::new("TXN-43"));
    assert_eq!(loaded.status, TransactionStatus::Processing);
}

#[test]
fn clear_removes_the_slot() {
    let (_dir, store) = store();
    store.save(&sample_transaction()).unwrap();
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());

    // Clearing an already-empty store is fine.
    store.clear().unwrap();
}

#[test]
fn fresh_record_survives_until_just_before_the_ttl() {
    let (_dir, store) = store();
    let mut txn = sample_transaction();
    txn.created_at = Utc::now() - Duration::hours(23) - Duration::minutes(59);
    store.save(&txn).unwrap();

    assert!(store.load().unwrap().is_some());
}

#[test]
fn expired_record_is_absent_and_deleted() {
    let (_dir, store) = store();
    let mut txn = sample_transaction();
    txn.created_at = Utc::now() - Duration::hours(24) - Duration::minutes(1);
    store.save(&txn).unwrap();

    assert!(store.load().unwrap().is_none());
    // The slot file itself is gone, not just filtered out.
    assert!(!store.path().exists());
}

#[test]
fn corrupt_record_is_absent_and_deleted() {
    let (_dir, store) = store();
    store.save(&sample_transaction()).unwrap();
    fs::write(store.path(), "{not json").unwrap();

    assert!(store.load().unwrap().is_none());
    assert!(!store.path().exists());
    // Subsequent loads stay clean.
    assert!(store.load().unwrap().is_none());
}
