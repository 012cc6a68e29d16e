//! Core Behavioural Properties
//!
//! Round-trip, counter monotonicity, validation filtering, overwrite
//! semantics, lookup misses and the empty-store counter.

use crate::*;
use escrowmap::KeyValueStore;
use proptest::prelude::*;

// =============================================================================
// ROUND-TRIP
// =============================================================================

#[test]
fn test_save_then_get_reproduces_table() {
    let (_, map) = create_map();
    let table = table_of([
        aged("a", 1, 0).with_transaction_hash("0x01"),
        aged("b", 2, 3).with_status(MappingStatus::Pending),
        aged("c", 9, 10).with_status(MappingStatus::Failed),
    ]);

    assert!(map.save_mappings(table.clone()).is_persisted());
    assert_eq!(map.get_mappings(), table);

    map.reload();
    assert_eq!(map.get_mappings(), table);
}

#[test]
fn test_save_never_diverges_from_reload() {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    let map = create_shared_map(backend.clone());

    let mut table = table_of([aged("kept", 2, 1)]);
    table.insert("renamed".into(), aged("original", 3, 1));
    map.save_mappings(table);

    let reopened = create_shared_map(backend);
    assert_eq!(map.get_mappings(), reopened.get_mappings());
    assert_eq!(reopened.get_mappings().keys().collect::<Vec<_>>(), vec!["kept"]);
}

#[test]
fn test_counter_exceeds_largest_accepted_id() {
    let (_, map) = create_map();
    assert!(map
        .set_mapping("too-big", u64::MAX, None, None)
        .unwrap_err()
        .is_invalid_input());
    map.set_mapping("edge", escrowmap::MAX_SAFE_INTEGER, None, None)
        .unwrap();
    assert!(map.next_contract_id() > escrowmap::MAX_SAFE_INTEGER);
}

fn arb_mapping() -> impl Strategy<Value = ContractIdMapping> {
    (
        "[a-z0-9-]{1,16}",
        1u64..1_000_000,
        0i64..1_000_000,
        proptest::option::of("0x[0-9a-f]{4,8}"),
        prop_oneof![
            Just(MappingStatus::Pending),
            Just(MappingStatus::Confirmed),
            Just(MappingStatus::Failed),
        ],
    )
        .prop_map(|(id, blockchain_id, age, hash, status)| {
            let mut m = ContractIdMapping::new(id, blockchain_id, NOW - age).with_status(status);
            m.transaction_hash = hash;
            m
        })
}

proptest! {
    #[test]
    fn prop_round_trip_through_backend(mappings in proptest::collection::vec(arb_mapping(), 0..20)) {
        let backend = Arc::new(MemoryStore::new());
        let table = table_of(mappings);

        create_shared_map(backend.clone()).save_mappings(table.clone());
        let reopened = create_shared_map(backend);
        prop_assert_eq!(reopened.get_mappings(), table);
    }

    #[test]
    fn prop_counter_exceeds_max_mapped_id(ids in proptest::collection::vec(1u64..10_000, 1..25)) {
        let (_, map) = create_map();
        for (i, id) in ids.iter().enumerate() {
            map.set_mapping(&format!("c{}", i), *id, None, None).unwrap();
        }
        prop_assert!(map.next_contract_id() > *ids.iter().max().unwrap());
    }
}

// =============================================================================
// VALIDATION FILTERING
// =============================================================================

#[test]
fn test_malformed_pair_dropped_on_load() {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    backend
        .set_item(
            &StoreKeys::default().mappings,
            r#"[
                ["good", {"contractId": "good", "blockchainId": 4, "createdAt": 1, "status": "confirmed"}],
                ["bad", {"contractId": "bad", "blockchainId": -4, "createdAt": 1, "status": "confirmed"}]
            ]"#,
        )
        .unwrap();

    let map = create_shared_map(backend);
    let table = map.get_mappings();
    assert_eq!(table.len(), 1);
    assert!(table.contains_key("good"));

    let report = map.store().last_load();
    assert_eq!(report.kept, 1);
    assert_eq!(report.dropped, 1);
}

#[test]
fn test_various_bad_records_dropped() {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    backend
        .set_item(
            &StoreKeys::default().mappings,
            r#"[
                ["ok", {"contractId": "ok", "blockchainId": 1, "createdAt": 1}],
                ["no-created", {"contractId": "no-created", "blockchainId": 1}],
                ["bad-status", {"contractId": "bad-status", "blockchainId": 1, "createdAt": 1, "status": "lost"}],
                ["mismatch", {"contractId": "other", "blockchainId": 1, "createdAt": 1}],
                ["string-id", {"contractId": "string-id", "blockchainId": "1", "createdAt": 1}],
                42,
                ["just-key"]
            ]"#,
        )
        .unwrap();

    let map = create_shared_map(backend);
    assert_eq!(map.get_mappings().keys().collect::<Vec<_>>(), vec!["ok"]);
    assert_eq!(map.store().last_load().dropped, 6);
}

#[test]
fn test_missing_status_defaults_to_confirmed() {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    backend
        .set_item(
            &StoreKeys::default().mappings,
            r#"[["legacy", {"contractId": "legacy", "blockchainId": 2, "createdAt": 1}]]"#,
        )
        .unwrap();
    let map = create_shared_map(backend);
    assert_eq!(map.mapping("legacy").unwrap().status, MappingStatus::Confirmed);
}

// =============================================================================
// OVERWRITE AND LOOKUPS
// =============================================================================

#[test]
fn test_set_twice_keeps_single_entry_with_second_hash() {
    let (_, map) = create_map();
    map.set_mapping("c1", 5, Some("0xfirst"), None).unwrap();
    map.set_mapping("c1", 5, Some("0xsecond"), None).unwrap();

    let table = map.get_mappings();
    assert_eq!(table.len(), 1);
    assert_eq!(table["c1"].transaction_hash.as_deref(), Some("0xsecond"));
}

#[test]
fn test_lookup_miss_returns_none() {
    let (_, map) = create_map();
    map.set_mapping("known", 3, None, None).unwrap();
    assert_eq!(map.blockchain_id("unknown"), None);
    assert_eq!(map.mapping("unknown"), None);
}

#[test]
fn test_empty_store_counter_is_one() {
    let (_, map) = create_map();
    assert_eq!(map.next_contract_id(), 1);
    assert!(map.get_mappings().is_empty());
}
