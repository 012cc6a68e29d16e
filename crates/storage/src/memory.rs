//! In-memory key-value store
//!
//! `BTreeMap` behind a `parking_lot::RwLock`. Used for tests and for embedding
//! without disk files. An optional quota reproduces the "storage full"
//! condition of browser-style stores.

use crate::error::{Result, StorageError};
use crate::{entry_cost, KeyValueStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory store with an optional byte quota
///
/// # Example
///
/// ```
/// use escrowmap_storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::with_quota(16);
/// store.set_item("k", "small").unwrap();
/// assert!(store.set_item("k", "far too large for the quota").unwrap_err().is_quota_exceeded());
/// assert_eq!(store.get_item("k").unwrap().as_deref(), Some("small"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes beyond `limit` bytes
    pub fn with_quota(limit: usize) -> Self {
        MemoryStore {
            data: RwLock::new(BTreeMap::new()),
            quota_bytes: Some(limit),
        }
    }

    /// Configured quota, if any
    pub fn quota_bytes(&self) -> Option<usize> {
        self.quota_bytes
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.data.write();

        if let Some(limit) = self.quota_bytes {
            let used: usize = data.iter().map(|(k, v)| entry_cost(k, v.len())).sum();
            let replaced = data.get(key).map_or(0, |v| entry_cost(key, v.len()));
            let requested = used - replaced + entry_cost(key, value.len());
            if requested > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested,
                    limit,
                });
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn usage_bytes(&self) -> Result<usize> {
        Ok(self
            .data
            .read()
            .iter()
            .map(|(k, v)| entry_cost(k, v.len()))
            .sum())
    }
}
