use aceplan_store::substrate::{MemoryStore, RedbStore, Substrate, SubstrateError};

fn test_store(quota: Option<u64>) -> (tempfile::TempDir, RedbStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RedbStore::open(dir.path().join("data"), quota).unwrap();
    (dir, store)
}

#[test]
fn test_redb_set_get() {
    let (_dir, store) = test_store(None);

    assert_eq!(store.get("missing").unwrap(), None);
    store.set("aceplan_subjects", "[]").unwrap();
    assert_eq!(store.get("aceplan_subjects").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_redb_overwrite() {
    let (_dir, store) = test_store(None);
    store.set("key", "first").unwrap();
    store.set("key", "second").unwrap();
    assert_eq!(store.get("key").unwrap().as_deref(), Some("second"));
    assert_eq!(store.usage().unwrap(), 9);
}

#[test]
fn test_redb_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = RedbStore::open(dir.path(), None).unwrap();
        store.set("aceplan_goalHours", "12").unwrap();
    }
    let store = RedbStore::open(dir.path(), None).unwrap();
    assert_eq!(store.get("aceplan_goalHours").unwrap().as_deref(), Some("12"));
}

#[test]
fn test_redb_remove() {
    let (_dir, store) = test_store(None);
    store.set("key", "value").unwrap();

    assert!(store.remove("key").unwrap());
    assert!(!store.remove("key").unwrap());
    assert_eq!(store.get("key").unwrap(), None);
    assert_eq!(store.usage().unwrap(), 0);
}

#[test]
fn test_redb_compare_and_swap() {
    let (_dir, store) = test_store(None);
    store.compare_and_swap("key", None, "v1").unwrap();
    store.compare_and_swap("key", Some("v1"), "v2").unwrap();

    let err = store.compare_and_swap("key", Some("v1"), "v3").unwrap_err();
    assert!(matches!(err, SubstrateError::Conflict { ref key } if key == "key"));
    assert_eq!(store.get("key").unwrap().as_deref(), Some("v2"));
}

#[test]
fn test_redb_quota_rejects_write_and_keeps_old_value() {
    let (_dir, store) = test_store(Some(16));
    store.set("key", "small").unwrap();

    let err = store.set("key", "this value is far too long").unwrap_err();
    assert!(matches!(err, SubstrateError::QuotaExceeded { quota: 16, .. }));
    assert_eq!(store.get("key").unwrap().as_deref(), Some("small"));
}

#[test]
fn test_memory_and_redb_agree_on_usage() {
    let (_dir, redb) = test_store(None);
    let memory = MemoryStore::new();

    for store in [&redb as &dyn Substrate, &memory as &dyn Substrate] {
        store.set("a", "1234").unwrap();
        store.set("bb", "56").unwrap();
        store.set("a", "7").unwrap();
        assert_eq!(store.usage().unwrap(), 6);
    }
}
