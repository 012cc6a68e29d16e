//! Mapping lifecycle: create, transition, remove
//!
//! ```text
//! set_mapping(.., Pending) ──► update_mapping_status(Confirmed | Failed)
//! set_mapping(..)          ──► Confirmed
//! ```
//!
//! Transitions are not checked. Moving a failed mapping back to pending is
//! allowed; callers own transition validity.

use crate::store::{MappingStore, State};
use escrowmap_core::{validate_mapping, ContractIdMapping, MappingStatus, Result};
use escrowmap_storage::KeyValueStore;
use tracing::{debug, warn};

impl<S: KeyValueStore> MappingStore<S> {
    /// Create or overwrite the mapping for `contract_id`
    ///
    /// `status` defaults to [`MappingStatus::Confirmed`]. Stamps `created_at`
    /// with the current time, persists the table and advances the counter
    /// past `blockchain_id`.
    ///
    /// # Errors
    ///
    /// [`escrowmap_core::Error::InvalidMapping`] when the mapping would not survive a reload:
    /// empty `contract_id`, `blockchain_id` outside `1..=MAX_SAFE_INTEGER`, or
    /// a clock reading at or before the epoch. Persistence failures are
    /// logged, not returned.
    pub fn set_mapping(
        &self,
        contract_id: impl Into<String>,
        blockchain_id: u64,
        transaction_hash: Option<&str>,
        status: Option<MappingStatus>,
    ) -> Result<ContractIdMapping> {
        let mut state = self.lock();
        self.insert_mapping(
            &mut state,
            contract_id.into(),
            blockchain_id,
            transaction_hash,
            status,
        )
    }

    /// [`set_mapping`](Self::set_mapping) under a held lock
    pub(crate) fn insert_mapping(
        &self,
        state: &mut State,
        contract_id: String,
        blockchain_id: u64,
        transaction_hash: Option<&str>,
        status: Option<MappingStatus>,
    ) -> Result<ContractIdMapping> {
        let mapping = ContractIdMapping {
            contract_id,
            blockchain_id,
            created_at: self.now(),
            transaction_hash: transaction_hash.map(str::to_string),
            status: status.unwrap_or_default(),
        };
        validate_mapping(&mapping.contract_id, &mapping)?;

        state
            .table
            .insert(mapping.contract_id.clone(), mapping.clone());
        self.persist(state, true);
        self.advance_counter(state, blockchain_id);

        debug!(
            "Mapped contract {} to escrow {} ({})",
            mapping.contract_id, mapping.blockchain_id, mapping.status
        );
        Ok(mapping)
    }

    /// Change the status of an existing mapping
    ///
    /// Attaches `transaction_hash` when given; otherwise the stored hash is
    /// kept. Returns `false` when no mapping exists for `contract_id`.
    pub fn update_mapping_status(
        &self,
        contract_id: &str,
        status: MappingStatus,
        transaction_hash: Option<&str>,
    ) -> bool {
        let mut state = self.lock();
        let mapping = match state.table.get_mut(contract_id) {
            Some(mapping) => mapping,
            None => {
                warn!("Cannot update status of unknown contract {}", contract_id);
                return false;
            }
        };

        let previous = mapping.status;
        mapping.status = status;
        if let Some(hash) = transaction_hash {
            mapping.transaction_hash = Some(hash.to_string());
        }

        self.persist(&mut state, true);
        debug!(
            "Contract {} status {} -> {}",
            contract_id, previous, status
        );
        true
    }

    /// Remove the mapping for `contract_id`
    ///
    /// Returns `true` if a mapping was removed.
    pub fn remove_mapping(&self, contract_id: &str) -> bool {
        let mut state = self.lock();
        if state.table.remove(contract_id).is_none() {
            return false;
        }
        self.persist(&mut state, true);
        debug!("Removed mapping for contract {}", contract_id);
        true
    }
}
