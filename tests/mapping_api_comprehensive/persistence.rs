//! Persistence Tests
//!
//! File-backed reopen, corrupt documents, schema marker handling and
//! custom storage keys.

use crate::*;
use escrowmap::{FileStore, KeyValueStore, SchemaCheck, SCHEMA_VERSION};

fn open_dir(path: &std::path::Path) -> EscrowMap {
    init_tracing();
    EscrowMap::builder()
        .path(path)
        .no_sync()
        .clock(Arc::new(ManualClock::new(NOW)))
        .open()
        .expect("Failed to open file-backed map")
}

#[test]
fn test_file_backed_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let map = open_dir(dir.path());
        map.set_mapping("order-1", 4, Some("0x4"), Some(MappingStatus::Pending))
            .unwrap();
        map.set_mapping("order-2", 9, None, None).unwrap();
        assert_eq!(map.path(), Some(dir.path()));
    }

    let map = open_dir(dir.path());
    assert_eq!(map.get_mappings().len(), 2);
    assert_eq!(map.mapping("order-1").unwrap().status, MappingStatus::Pending);
    assert_eq!(map.blockchain_id("order-2"), Some(9));
    assert_eq!(map.next_contract_id(), 10);
    assert_eq!(map.store().last_load().schema, SchemaCheck::Current);
}

#[test]
fn test_open_convenience_constructor() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let map = EscrowMap::open(dir.path().join("nested")).unwrap();
    map.set_mapping("c", 1, None, None).unwrap();
    assert!(dir.path().join("nested").is_dir());
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        store
            .set_item(&StoreKeys::default().mappings, "]]] not json")
            .unwrap();
        store
            .set_item(&StoreKeys::default().next_contract_id, "17")
            .unwrap();
    }

    let map = open_dir(dir.path());
    assert!(map.get_mappings().is_empty());
    assert!(map.store().last_load().corrupt);
    // The counter is independent of the table document
    assert_eq!(map.next_contract_id(), 17);

    // The next write replaces the corrupt document
    map.set_mapping("fresh", 20, None, None).unwrap();
    let reopened = open_dir(dir.path());
    assert!(!reopened.store().last_load().corrupt);
    assert_eq!(reopened.blockchain_id("fresh"), Some(20));
}

#[test]
fn test_version_mismatch_does_not_block() {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    let keys = StoreKeys::default();
    backend.set_item(&keys.version, "0.9").unwrap();
    backend
        .set_item(
            &keys.mappings,
            r#"[["old", {"contractId": "old", "blockchainId": 3, "createdAt": 5}]]"#,
        )
        .unwrap();

    let map = create_shared_map(backend.clone());
    assert_eq!(
        map.store().last_load().schema,
        SchemaCheck::Mismatch {
            stored: "0.9".to_string()
        }
    );
    assert_eq!(map.blockchain_id("old"), Some(3));

    map.set_mapping("new", 4, None, None).unwrap();
    assert_eq!(
        backend.get_item(&keys.version).unwrap().as_deref(),
        Some(SCHEMA_VERSION)
    );
}

#[test]
fn test_custom_key_prefix_isolates_stores() {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    let a = EscrowMap::builder()
        .backend(backend.clone())
        .options(OpenOptions::new().keys(StoreKeys::with_prefix("tenant_a")))
        .open()
        .unwrap();
    let b = EscrowMap::builder()
        .backend(backend.clone())
        .options(OpenOptions::new().keys(StoreKeys::with_prefix("tenant_b")))
        .open()
        .unwrap();

    a.set_mapping("shared-name", 1, None, None).unwrap();
    b.set_mapping("shared-name", 50, None, None).unwrap();

    assert_eq!(a.blockchain_id("shared-name"), Some(1));
    assert_eq!(b.blockchain_id("shared-name"), Some(50));
    assert_eq!(a.next_contract_id(), 2);
    assert_eq!(b.next_contract_id(), 51);
    assert_eq!(backend.len(), 6);
}

#[test]
fn test_reload_observes_foreign_writes() {
    let backend = Arc::new(MemoryStore::new());
    let reader = create_shared_map(backend.clone());
    let writer = create_shared_map(backend);

    writer.set_mapping("late", 8, None, None).unwrap();
    assert_eq!(reader.blockchain_id("late"), None);

    let report = reader.reload();
    assert_eq!(report.kept, 1);
    assert_eq!(reader.blockchain_id("late"), Some(8));
    assert_eq!(reader.next_contract_id(), 9);
}
