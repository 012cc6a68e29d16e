//! Core types for escrowmap
//!
//! This crate defines the data model shared by every other crate:
//! - [`ContractIdMapping`]: one application contract mapped to an on-chain escrow id
//! - [`MappingStatus`]: pending / confirmed / failed lifecycle state
//! - [`MappingTable`]: the keyed table held in memory and persisted as pairs
//! - [`validate`]: record validation applied on every load and import
//! - [`Clock`]: time source used to stamp `created_at`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod types;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, RecordError, Result};
pub use types::{ContractIdMapping, MappingStats, MappingStatus, MappingTable, Timestamp};
pub use validate::{validate_mapping, validate_pair, validate_record};

/// Current schema version written next to every saved table.
pub const SCHEMA_VERSION: &str = "1.0";

/// Value returned by the counter when nothing usable is stored.
pub const DEFAULT_NEXT_CONTRACT_ID: u64 = 1;

/// Default retention window for non-pending mappings, in days.
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Largest id or timestamp accepted in a record.
///
/// Documents are shared with JavaScript clients, which lose precision above
/// 2^53 - 1. Keeping ids at or below this bound also leaves room for the
/// counter to move strictly past the largest mapped id.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;
