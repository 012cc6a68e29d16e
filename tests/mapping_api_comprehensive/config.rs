//! Configuration Tests
//!
//! TOML loading through the builder and its effect on keys, retention and
//! quota.

use crate::*;
use escrowmap::KeyValueStore;
use std::io::Write;

fn write_config(dir: &std::path::Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("escrowmap.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    path
}

#[test]
fn test_toml_config_applies_keys_and_retention() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[keys]
mappings = "staging_mappings"
next_contract_id = "staging_next_id"
version = "staging_version"

[retention]
max_age_days = 7
"#,
    );

    let backend = Arc::new(MemoryStore::new());
    let map = EscrowMap::builder()
        .backend(backend.clone())
        .config_file(&config)
        .clock(Arc::new(ManualClock::new(NOW)))
        .open()
        .unwrap();

    assert_eq!(map.options().retention.max_age_days, 7);
    map.set_mapping("c", 1, None, None).unwrap();
    assert!(backend.get_item("staging_mappings").unwrap().is_some());
    assert_eq!(backend.get_item("staging_next_id").unwrap().as_deref(), Some("2"));

    map.save_mappings(table_of([aged("eight-days", 2, 8), aged("six-days", 3, 6)]));
    assert_eq!(map.clear_old_mappings(), 1);
}

#[test]
fn test_toml_quota_applies_to_file_backend() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "quota_bytes = 200\n");

    let map = EscrowMap::builder()
        .path(dir.path().join("data"))
        .no_sync()
        .config_file(&config)
        .clock(Arc::new(ManualClock::new(NOW)))
        .open()
        .unwrap();
    assert_eq!(map.options().quota_bytes, Some(200));

    let outcome = map.save_mappings(table_of((1..=10).map(|i| aged(&format!("c{}", i), i, 0))));
    assert!(!outcome.is_persisted());
}

#[test]
fn test_empty_toml_is_all_defaults() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let map = EscrowMap::builder().config_file(&config).open().unwrap();
    assert_eq!(map.options(), &OpenOptions::default());
}

#[test]
fn test_bad_toml_is_config_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[retention]\nmax_age_days = \"soon\"\n");
    let err = EscrowMap::builder().config_file(&config).open().unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_duplicate_keys_rejected() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[keys]\nmappings = \"same\"\nnext_contract_id = \"same\"\n",
    );
    assert!(EscrowMap::builder()
        .config_file(&config)
        .open()
        .unwrap_err()
        .is_config());
}
