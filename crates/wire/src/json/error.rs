//! Document-level decode errors
//!
//! These reject a whole document. Problems with individual records are not
//! errors; see [`RejectedRecord`](super::RejectedRecord).

use thiserror::Error;

/// Decode error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Invalid JSON syntax
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Valid JSON, wrong top-level shape
    #[error("invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::InvalidJson(e.to_string())
    }
}
