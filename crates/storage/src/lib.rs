//! Key-value storage backends for escrowmap
//!
//! The mapping store persists three string values under fixed keys. This
//! crate provides the seam it writes through:
//! - [`KeyValueStore`]: synchronous string key-value trait
//! - [`MemoryStore`]: `BTreeMap` behind a `RwLock`, with an optional byte quota
//! - [`FileStore`]: one file per key in a directory, atomic replace on write
//!
//! Backends report a full store as [`StorageError::QuotaExceeded`]; the
//! mapping store reacts to that variant by pruning old mappings.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod file;
pub mod memory;

pub use error::{Result, StorageError};
pub use file::{FileStore, SyncMode};
pub use memory::MemoryStore;

use std::sync::Arc;

/// Synchronous string key-value store
///
/// Implementations must be safe to share between threads. Reads of a missing
/// key return `Ok(None)`; removing a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List all keys currently stored
    fn keys(&self) -> Result<Vec<String>>;

    /// Bytes currently used, as counted against the quota
    fn usage_bytes(&self) -> Result<usize>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn usage_bytes(&self) -> Result<usize> {
        (**self).usage_bytes()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn usage_bytes(&self) -> Result<usize> {
        (**self).usage_bytes()
    }
}

/// Bytes charged for one entry against a quota
#[inline]
pub(crate) fn entry_cost(key: &str, value_len: usize) -> usize {
    key.len() + value_len
}
