//! Public types for the escrowmap API.
//!
//! Re-exports types from the internal crates with a clean public interface.

// Records
pub use escrowmap_core::{ContractIdMapping, MappingStats, MappingStatus, MappingTable, Timestamp};

// Time
pub use escrowmap_core::{Clock, ManualClock, SystemClock};

// Configuration
pub use escrowmap_config::{OpenOptions, RetentionPolicy, StoreKeys};

// Backends
pub use escrowmap_storage::{FileStore, KeyValueStore, MemoryStore, StorageError, SyncMode};

// Reports and the registration flow
pub use escrowmap_engine::{
    ChainError, DebugDump, EscrowChain, EscrowRegistrar, ImportReport, LoadReport, MappingStore,
    SaveOutcome,
};
pub use escrowmap_wire::SchemaCheck;

/// Schema version written alongside the table
pub use escrowmap_core::SCHEMA_VERSION;

/// Largest escrow id or timestamp a mapping may carry
pub use escrowmap_core::MAX_SAFE_INTEGER;
