//! Escrow registration flow
//!
//! The escrow contract assigns ids sequentially. A registration reserves an
//! id as a pending mapping before the transaction is sent, then confirms or
//! fails it once the transaction settles:
//!
//! ```text
//! reserve ──► Pending ──► confirm ──► Confirmed
//!                    └──► fail    ──► Failed
//! ```

use crate::store::MappingStore;
use escrowmap_core::{ContractIdMapping, MappingStatus, Result};
use escrowmap_storage::KeyValueStore;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors reported by an [`EscrowChain`]
#[derive(Debug, Error)]
pub enum ChainError {
    /// Node or RPC endpoint could not be reached
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// Call reached the chain and was rejected
    #[error("chain rejected call: {0}")]
    Rejected(String),
}

/// Read access to the escrow contract
pub trait EscrowChain {
    /// Highest escrow id the contract has issued, `None` if it has issued none
    fn latest_escrow_id(&self) -> std::result::Result<Option<u64>, ChainError>;
}

impl<T: EscrowChain + ?Sized> EscrowChain for &T {
    fn latest_escrow_id(&self) -> std::result::Result<Option<u64>, ChainError> {
        (**self).latest_escrow_id()
    }
}

/// Drives a [`MappingStore`] through the escrow registration flow
pub struct EscrowRegistrar<'a, S: KeyValueStore, C: EscrowChain + ?Sized> {
    store: &'a MappingStore<S>,
    chain: &'a C,
}

impl<'a, S: KeyValueStore, C: EscrowChain + ?Sized> EscrowRegistrar<'a, S, C> {
    /// Create a registrar over `store` and `chain`
    pub fn new(store: &'a MappingStore<S>, chain: &'a C) -> Self {
        EscrowRegistrar { store, chain }
    }

    /// Escrow id the next registration is expected to receive
    ///
    /// The larger of the chain's next id and the store's counter. Falls back
    /// to the counter alone when the chain cannot be queried.
    pub fn expected_escrow_id(&self) -> u64 {
        let chain_next = self.chain_next_id();
        let local = self.store.next_contract_id();
        chain_next.map_or(local, |next| next.max(local))
    }

    /// Record a pending mapping for `contract_id` under the expected escrow id
    ///
    /// The id is chosen and recorded under one store lock, so concurrent
    /// reservations never share an id.
    pub fn reserve(
        &self,
        contract_id: &str,
        transaction_hash: Option<&str>,
    ) -> Result<ContractIdMapping> {
        let chain_next = self.chain_next_id();

        let mut state = self.store.lock();
        let local = state.next_contract_id;
        let escrow_id = chain_next.map_or(local, |next| next.max(local));
        let mapping = self.store.insert_mapping(
            &mut state,
            contract_id.to_string(),
            escrow_id,
            transaction_hash,
            Some(MappingStatus::Pending),
        )?;
        drop(state);

        info!("Reserved escrow {} for contract {}", escrow_id, contract_id);
        Ok(mapping)
    }

    fn chain_next_id(&self) -> Option<u64> {
        match self.chain.latest_escrow_id() {
            Ok(latest) => Some(latest.map_or(1, |id| id.saturating_add(1))),
            Err(e) => {
                warn!("Using local counter for escrow id: {}", e);
                None
            }
        }
    }

    /// Mark the registration of `contract_id` confirmed
    ///
    /// When `escrow_id` is given and differs from the reserved id, the mapping
    /// is re-set with the id the chain actually assigned. Returns `false`
    /// when no mapping exists for `contract_id`.
    pub fn confirm(
        &self,
        contract_id: &str,
        escrow_id: Option<u64>,
        transaction_hash: Option<&str>,
    ) -> Result<bool> {
        let reserved = match self.store.mapping(contract_id) {
            Some(mapping) => mapping,
            None => {
                warn!("Cannot confirm unknown contract {}", contract_id);
                return Ok(false);
            }
        };

        match escrow_id {
            Some(actual) if actual != reserved.blockchain_id => {
                info!(
                    "Contract {} settled on escrow {} (reserved {})",
                    contract_id, actual, reserved.blockchain_id
                );
                let hash = transaction_hash.or(reserved.transaction_hash.as_deref());
                self.store
                    .set_mapping(contract_id, actual, hash, Some(MappingStatus::Confirmed))?;
                Ok(true)
            }
            _ => Ok(self.store.update_mapping_status(
                contract_id,
                MappingStatus::Confirmed,
                transaction_hash,
            )),
        }
    }

    /// Mark the registration of `contract_id` failed
    pub fn fail(&self, contract_id: &str, transaction_hash: Option<&str>) -> bool {
        self.store
            .update_mapping_status(contract_id, MappingStatus::Failed, transaction_hash)
    }

    /// Escrow id for `contract_id`
    pub fn resolve(&self, contract_id: &str) -> Option<u64> {
        let id = self.store.blockchain_id(contract_id);
        if id.is_none() {
            debug!("Contract {} has no escrow registration", contract_id);
        }
        id
    }
}
