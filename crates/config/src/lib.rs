//! Configuration for escrowmap stores.
//!
//! This crate provides the [`OpenOptions`] type used to control how a mapping
//! store is opened: which storage keys it uses, how long non-pending mappings
//! are retained, and an optional byte quota for backends built by the facade.
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! quota_bytes = 5242880
//!
//! [keys]
//! mappings = "app_contract_id_mappings"
//!
//! [retention]
//! max_age_days = 14
//! ```

#![warn(missing_docs)]

use escrowmap_core::{DEFAULT_RETENTION_DAYS, MILLIS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML could not be parsed into options
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Options parsed but are unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Storage keys for the three persisted values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreKeys {
    /// Key holding the mapping table
    pub mappings: String,
    /// Key holding the next-id counter
    pub next_contract_id: String,
    /// Key holding the schema marker
    pub version: String,
}

impl StoreKeys {
    /// Keys sharing a common prefix, e.g. `"staging"` gives
    /// `staging_contract_id_mappings` and so on.
    pub fn with_prefix(prefix: &str) -> Self {
        StoreKeys {
            mappings: format!("{}_contract_id_mappings", prefix),
            next_contract_id: format!("{}_next_contract_id", prefix),
            version: format!("{}_mapping_version", prefix),
        }
    }

    /// All keys, in table / counter / version order
    pub fn all(&self) -> [&str; 3] {
        [&self.mappings, &self.next_contract_id, &self.version]
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::with_prefix("smartjects")
    }
}

/// How long settled mappings are kept before pruning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// Age in days after which confirmed and failed mappings may be pruned
    pub max_age_days: u64,
}

impl RetentionPolicy {
    /// Policy keeping settled mappings for `days`
    pub fn days(days: u64) -> Self {
        RetentionPolicy { max_age_days: days }
    }

    /// Retention window in milliseconds
    pub fn max_age_millis(&self) -> i64 {
        (self.max_age_days as i64).saturating_mul(MILLIS_PER_DAY)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy {
            max_age_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Options for opening a mapping store.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use escrowmap_config::{OpenOptions, RetentionPolicy};
///
/// let opts = OpenOptions::new()
///     .retention(RetentionPolicy::days(7))
///     .quota_bytes(64 * 1024);
/// assert_eq!(opts.retention.max_age_days, 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Storage keys
    pub keys: StoreKeys,
    /// Pruning window
    pub retention: RetentionPolicy,
    /// Byte quota applied to backends created by the facade
    pub quota_bytes: Option<usize>,
}

impl OpenOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage keys
    pub fn keys(mut self, keys: StoreKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Set the retention policy
    pub fn retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Set the byte quota
    pub fn quota_bytes(mut self, limit: usize) -> Self {
        self.quota_bytes = Some(limit);
        self
    }

    /// Parse options from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let opts: OpenOptions = toml::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read and parse a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that the three keys are non-empty and distinct
    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = self.keys.all();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::Invalid("storage keys must not be empty".into()));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(ConfigError::Invalid("storage keys must be distinct".into()));
        }
        Ok(())
    }
}
