//! Unified error types for escrowmap.
//!
//! Wraps the errors of the internal crates in one enum so callers of the
//! facade match on a single type.

use thiserror::Error;

/// All escrowmap errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Mutation refused because the record would be invalid
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    /// Import document rejected; the store was not modified
    #[error("invalid import: {0}")]
    InvalidImport(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("config error: {0}")]
    Config(String),

    /// Backend could not be opened
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for escrowmap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the caller passed bad input (mapping or import document).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidMapping(_) | Error::InvalidImport(_))
    }

    /// Check if this is a rejected import.
    pub fn is_invalid_import(&self) -> bool {
        matches!(self, Error::InvalidImport(_))
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl From<escrowmap_core::Error> for Error {
    fn from(e: escrowmap_core::Error) -> Self {
        use escrowmap_core::Error as CoreError;
        match e {
            CoreError::InvalidMapping(msg) => Error::InvalidMapping(msg),
            CoreError::InvalidImport(msg) => Error::InvalidImport(msg),
            CoreError::Serialization(msg) => Error::Serialization(msg),
        }
    }
}

impl From<escrowmap_storage::StorageError> for Error {
    fn from(e: escrowmap_storage::StorageError) -> Self {
        use escrowmap_storage::StorageError;
        match e {
            StorageError::Io(io_err) => Error::Io(io_err),
            other => Error::Storage(other.to_string()),
        }
    }
}

impl From<escrowmap_config::ConfigError> for Error {
    fn from(e: escrowmap_config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
