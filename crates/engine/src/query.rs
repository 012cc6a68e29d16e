//! Read-only queries and diagnostics

use crate::store::{LoadReport, MappingStore};
use escrowmap_core::{ContractIdMapping, MappingStats};
use escrowmap_storage::KeyValueStore;
use tracing::debug;

/// Snapshot of store internals for troubleshooting
#[derive(Debug, Clone, PartialEq)]
pub struct DebugDump {
    /// Aggregate counts
    pub stats: MappingStats,
    /// Known contract ids, sorted
    pub contract_ids: Vec<String>,
    /// Schema marker currently in the backend
    pub stored_version: Option<String>,
    /// Size of the persisted table document, if readable
    pub stored_table_bytes: Option<usize>,
    /// Backend usage, if the backend reports it
    pub backend_usage_bytes: Option<usize>,
    /// Report from the most recent load
    pub last_load: LoadReport,
}

impl<S: KeyValueStore> MappingStore<S> {
    /// Escrow id mapped to `contract_id`
    ///
    /// A miss is not an error; the known contract ids are logged to help
    /// track down mismatched keys.
    pub fn blockchain_id(&self, contract_id: &str) -> Option<u64> {
        let state = self.lock();
        match state.table.get(contract_id) {
            Some(mapping) => Some(mapping.blockchain_id),
            None => {
                let known: Vec<&str> = state.table.keys().map(String::as_str).collect();
                debug!(
                    "No escrow id for contract {}; known contracts: {:?}",
                    contract_id, known
                );
                None
            }
        }
    }

    /// Full mapping record for `contract_id`
    pub fn mapping(&self, contract_id: &str) -> Option<ContractIdMapping> {
        self.lock().table.get(contract_id).cloned()
    }

    /// Every contract id mapped to `blockchain_id`
    ///
    /// Usually zero or one, but nothing prevents several application
    /// contracts sharing one escrow.
    pub fn contract_ids_by_blockchain_id(&self, blockchain_id: u64) -> Vec<String> {
        self.lock()
            .table
            .values()
            .filter(|m| m.blockchain_id == blockchain_id)
            .map(|m| m.contract_id.clone())
            .collect()
    }

    /// All mappings, newest first
    pub fn all_mappings(&self) -> Vec<ContractIdMapping> {
        let mut all: Vec<ContractIdMapping> = self.lock().table.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Counts per status plus the counter
    pub fn stats(&self) -> MappingStats {
        let state = self.lock();
        MappingStats::collect(state.table.values(), state.next_contract_id)
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.lock().table.len()
    }

    /// Check if the store holds no mappings
    pub fn is_empty(&self) -> bool {
        self.lock().table.is_empty()
    }

    /// Collect diagnostics and emit them at debug level
    pub fn debug_dump(&self) -> DebugDump {
        let (stats, contract_ids, last_load) = {
            let state = self.lock();
            (
                MappingStats::collect(state.table.values(), state.next_contract_id),
                state.table.keys().cloned().collect::<Vec<_>>(),
                state.last_load.clone(),
            )
        };
        let keys = &self.options.keys;
        let dump = DebugDump {
            stats,
            contract_ids,
            stored_version: self.backend.get_item(&keys.version).ok().flatten(),
            stored_table_bytes: self
                .backend
                .get_item(&keys.mappings)
                .ok()
                .flatten()
                .map(|raw| raw.len()),
            backend_usage_bytes: self.backend.usage_bytes().ok(),
            last_load,
        };

        debug!("Contract id mapping dump: {:?}", dump.stats);
        for id in &dump.contract_ids {
            debug!("  {}", id);
        }
        debug!(
            "Stored version {:?}, table {:?} bytes, backend {:?} bytes",
            dump.stored_version, dump.stored_table_bytes, dump.backend_usage_bytes
        );
        dump
    }
}
