//! # escrowmap
//!
//! Durable mapping between application contract ids and on-chain escrow ids.
//!
//! Applications identify a contract by a string id long before the escrow
//! contract on chain assigns it a numeric id. escrowmap records that
//! correspondence, tracks whether the registering transaction is pending,
//! confirmed or failed, suggests the next escrow id, and prunes settled
//! mappings after a retention window.
//!
//! ## Quick Start
//!
//! ```
//! use escrowmap::prelude::*;
//!
//! let map = EscrowMap::ephemeral()?;
//!
//! // Reserve while the transaction is in flight
//! map.set_mapping("order-42", 7, None, Some(MappingStatus::Pending))?;
//!
//! // Settle once it is mined
//! map.update_mapping_status("order-42", MappingStatus::Confirmed, Some("0xabc"));
//!
//! assert_eq!(map.blockchain_id("order-42"), Some(7));
//! assert_eq!(map.next_contract_id(), 8);
//! # Ok::<(), escrowmap::Error>(())
//! ```
//!
//! ## Failure Model
//!
//! Storage problems never reach the caller. Corrupt documents load as an
//! empty table, invalid records are dropped, a full backend triggers pruning,
//! and lookups of unknown ids return `None`. All of these are logged through
//! `tracing`. Errors are returned only for invalid arguments, rejected import
//! documents, and configuration or I/O failures while opening.
//!
//! ## Crates
//!
//! - `escrowmap-core`: records, validation, clock
//! - `escrowmap-storage`: [`KeyValueStore`] and its memory and file backends
//! - `escrowmap-wire`: JSON codecs for the table, counter and export document
//! - `escrowmap-config`: [`OpenOptions`]
//! - `escrowmap-engine`: [`MappingStore`] and [`EscrowRegistrar`]

#![warn(missing_docs)]

mod error;
mod manager;
mod types;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use manager::{DynStore, EscrowMap, EscrowMapBuilder};

// Re-export types
pub use types::*;
