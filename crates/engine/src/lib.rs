//! Mapping store engine for escrowmap
//!
//! [`MappingStore`] owns the contract-id mapping table and everything that
//! keeps it consistent with the backing [`KeyValueStore`]:
//!
//! - schema guard: warns when the stored marker differs from the current version
//! - codec: table ⇄ array of pairs, invalid records dropped on load
//! - counter: advisory next escrow id, advanced by every `set_mapping`
//! - lifecycle: pending / confirmed / failed per mapping
//! - reclaimer: prunes settled mappings past the retention window, also run
//!   automatically when a save hits the storage quota
//! - export / import of the whole store
//!
//! [`EscrowRegistrar`] drives the store from the blockchain-escrow flow.
//!
//! ## Failure Model
//!
//! Nothing here is fatal to the caller. Corrupt documents, rejected records,
//! quota exhaustion and lookup misses are logged through `tracing` and the
//! store keeps operating on what it has in memory. The only errors returned
//! are invalid arguments to a mutation and rejected import documents.
//!
//! ```
//! use escrowmap_engine::MappingStore;
//! use escrowmap_config::OpenOptions;
//! use escrowmap_core::MappingStatus;
//! use escrowmap_storage::MemoryStore;
//!
//! let store = MappingStore::open(MemoryStore::new(), OpenOptions::default());
//! store.set_mapping("order-42", 7, None, Some(MappingStatus::Pending)).unwrap();
//! assert!(store.update_mapping_status("order-42", MappingStatus::Confirmed, Some("0xabc")));
//! assert_eq!(store.blockchain_id("order-42"), Some(7));
//! assert_eq!(store.next_contract_id(), 8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod counter;
pub mod escrow;
mod lifecycle;
mod query;
mod reclaim;
mod store;
mod transfer;

pub use escrow::{ChainError, EscrowChain, EscrowRegistrar};
pub use query::DebugDump;
pub use store::{LoadReport, MappingStore, SaveOutcome};
pub use transfer::ImportReport;

pub use escrowmap_core::{Error, Result};
pub use escrowmap_storage::KeyValueStore;
