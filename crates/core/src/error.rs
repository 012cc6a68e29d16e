//! Error types for escrowmap
//!
//! Two families:
//! - [`RecordError`]: why a persisted or imported record was rejected. These
//!   are never returned to callers of the store; the record is dropped and the
//!   reason logged.
//! - [`Error`]: the few conditions that do reach callers (invalid input to a
//!   mutation, rejected import, serialization failure).

use thiserror::Error;

/// Reason a single `[contractId, mapping]` pair was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Pair is not a two-element `[string, object]` array
    #[error("malformed pair: {0}")]
    MalformedPair(String),

    /// Record is not a JSON object
    #[error("record is not an object")]
    NotAnObject,

    /// Required field absent
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// Field present with an unusable value
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Field name as persisted
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Pair key differs from the record's own `contractId`
    #[error("key `{key}` does not match contractId `{contract_id}`")]
    KeyMismatch {
        /// Key of the pair
        key: String,
        /// `contractId` inside the record
        contract_id: String,
    },
}

/// Errors surfaced to callers
#[derive(Debug, Error)]
pub enum Error {
    /// Mutation refused because the resulting record would be invalid
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    /// Import document rejected as a whole; the store was not touched
    #[error("invalid import: {0}")]
    InvalidImport(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for escrowmap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is an invalid-mapping error.
    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self, Error::InvalidMapping(_))
    }

    /// Check if this is a rejected import.
    pub fn is_invalid_import(&self) -> bool {
        matches!(self, Error::InvalidImport(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        Error::InvalidMapping(e.to_string())
    }
}
