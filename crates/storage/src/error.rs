//! Storage errors

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would push the store past its byte quota
    #[error("quota exceeded writing `{key}`: {requested} bytes requested, limit {limit}")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total usage the write would have produced
        requested: usize,
        /// Configured limit
        limit: usize,
    },

    /// Key cannot be represented by this backend
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey {
        /// Offending key
        key: String,
        /// Why it was refused
        reason: String,
    },

    /// Stored bytes are not valid UTF-8
    #[error("value under `{0}` is not valid UTF-8")]
    InvalidUtf8(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Check if this error signals a full store.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
