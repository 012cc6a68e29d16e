//! Mapping store state, load path and save path
//!
//! ## Consistency Model
//!
//! The in-memory table is authoritative for the lifetime of the store. It is
//! loaded once at open (and again on [`MappingStore::reload`]); every mutation
//! is applied in memory first and then written through to the backend. A
//! failed write is logged and does not roll the in-memory change back.
//!
//! Writers in other processes sharing the backend are not observed until
//! `reload`, and whole-table saves are last-writer-wins.

use escrowmap_config::OpenOptions;
use escrowmap_core::{
    validate_mapping, Clock, MappingTable, SystemClock, DEFAULT_NEXT_CONTRACT_ID,
};
use escrowmap_storage::KeyValueStore;
use escrowmap_wire::{check_schema, decode_counter, decode_table, encode_table, SchemaCheck};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What the last load found in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Schema marker comparison
    pub schema: SchemaCheck,
    /// Records loaded
    pub kept: usize,
    /// Records dropped by validation
    pub dropped: usize,
    /// Whether the table document itself was unreadable
    pub corrupt: bool,
}

impl Default for LoadReport {
    fn default() -> Self {
        LoadReport {
            schema: SchemaCheck::Fresh,
            kept: 0,
            dropped: 0,
            corrupt: false,
        }
    }
}

/// Result of writing the table to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Table and schema marker written
    Saved,
    /// Backend was full; old mappings were pruned and the pruned table
    /// written instead
    Reclaimed {
        /// Mappings pruned
        removed: usize,
        /// Whether the pruned table was written successfully
        persisted: bool,
    },
    /// Write failed; the in-memory table is unchanged
    Failed,
}

impl SaveOutcome {
    /// Check if the current table reached the backend
    pub fn is_persisted(&self) -> bool {
        matches!(
            self,
            SaveOutcome::Saved
                | SaveOutcome::Reclaimed {
                    persisted: true,
                    ..
                }
        )
    }
}

pub(crate) struct State {
    pub(crate) table: MappingTable,
    pub(crate) next_contract_id: u64,
    pub(crate) last_load: LoadReport,
}

/// Durable mapping between application contract ids and on-chain escrow ids
///
/// All methods take `&self`; an internal lock serializes load-mutate-save so
/// the store can be shared between threads.
pub struct MappingStore<S: KeyValueStore> {
    pub(crate) backend: S,
    pub(crate) options: OpenOptions,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) state: Mutex<State>,
}

impl<S: KeyValueStore> MappingStore<S> {
    /// Open a store over `backend` using the system clock
    pub fn open(backend: S, options: OpenOptions) -> Self {
        Self::open_with_clock(backend, options, Arc::new(SystemClock))
    }

    /// Open a store with an explicit clock
    pub fn open_with_clock(backend: S, options: OpenOptions, clock: Arc<dyn Clock>) -> Self {
        let store = MappingStore {
            backend,
            options,
            clock,
            state: Mutex::new(State {
                table: MappingTable::new(),
                next_contract_id: DEFAULT_NEXT_CONTRACT_ID,
                last_load: LoadReport::default(),
            }),
        };
        store.reload();
        store
    }

    /// Re-read table and counter from the backend, replacing in-memory state
    ///
    /// Unsaved in-memory changes (from failed writes) are discarded.
    pub fn reload(&self) -> LoadReport {
        let mut state = self.state.lock();
        let (table, report) = self.load_table();
        state.table = table;
        state.next_contract_id = self.load_counter();
        state.last_load = report.clone();
        debug!(
            "Loaded {} mappings ({} dropped), next contract id {}",
            report.kept, report.dropped, state.next_contract_id
        );
        report
    }

    /// Snapshot of the current table
    pub fn get_mappings(&self) -> MappingTable {
        self.state.lock().table.clone()
    }

    /// Replace the table and persist it
    ///
    /// Entries the load path would drop (key not matching `contractId`,
    /// out-of-range ids or timestamps) are dropped here too, with a warning,
    /// so memory matches what a reload returns.
    pub fn save_mappings(&self, mut table: MappingTable) -> SaveOutcome {
        table.retain(|key, mapping| match validate_mapping(key, mapping) {
            Ok(()) => true,
            Err(e) => {
                warn!("Not saving mapping {}: {}", key, e);
                false
            }
        });
        let mut state = self.state.lock();
        state.table = table;
        self.persist(&mut state, true)
    }

    /// Remove every mapping, the counter and the schema marker
    pub fn clear_all_mappings(&self) {
        let mut state = self.state.lock();
        for key in self.options.keys.all() {
            if let Err(e) = self.backend.remove_item(key) {
                error!("Failed to remove {}: {}", key, e);
            }
        }
        let removed = state.table.len();
        state.table.clear();
        state.next_contract_id = DEFAULT_NEXT_CONTRACT_ID;
        state.last_load = LoadReport::default();
        info!("Cleared all contract id mappings ({} removed)", removed);
    }

    /// Report from the most recent load
    pub fn last_load(&self) -> LoadReport {
        self.state.lock().last_load.clone()
    }

    /// Options the store was opened with
    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    /// Underlying backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    // =========================================================================
    // Load path
    // =========================================================================

    fn check_schema_marker(&self) -> SchemaCheck {
        let stored = match self.backend.get_item(&self.options.keys.version) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not read schema marker: {}", e);
                None
            }
        };
        let check = check_schema(stored.as_deref());
        if let SchemaCheck::Mismatch { stored } = &check {
            warn!(
                "Contract id mapping schema mismatch: stored {}, current {}; continuing without migration",
                stored,
                escrowmap_core::SCHEMA_VERSION
            );
        }
        check
    }

    fn load_table(&self) -> (MappingTable, LoadReport) {
        let mut report = LoadReport {
            schema: self.check_schema_marker(),
            ..Default::default()
        };

        let raw = match self.backend.get_item(&self.options.keys.mappings) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (MappingTable::new(), report),
            Err(e) => {
                error!("Failed to read contract id mappings: {}", e);
                report.corrupt = true;
                return (MappingTable::new(), report);
            }
        };

        match decode_table(&raw) {
            Ok(decoded) => {
                for rejected in &decoded.rejected {
                    warn!(
                        "Dropping invalid mapping #{} ({}): {}",
                        rejected.index,
                        rejected.key.as_deref().unwrap_or("<no key>"),
                        rejected.reason
                    );
                }
                report.kept = decoded.table.len();
                report.dropped = decoded.rejected.len();
                (decoded.table, report)
            }
            Err(e) => {
                error!("Stored contract id mappings are unreadable, starting empty: {}", e);
                report.corrupt = true;
                (MappingTable::new(), report)
            }
        }
    }

    fn load_counter(&self) -> u64 {
        match self.backend.get_item(&self.options.keys.next_contract_id) {
            Ok(raw) => decode_counter(raw.as_deref()).unwrap_or(DEFAULT_NEXT_CONTRACT_ID),
            Err(e) => {
                warn!("Could not read next contract id: {}", e);
                DEFAULT_NEXT_CONTRACT_ID
            }
        }
    }

    // =========================================================================
    // Save path
    // =========================================================================

    /// Write the table and schema marker.
    ///
    /// On quota exhaustion, and only when `allow_reclaim` is set, prunes old
    /// mappings once and writes the pruned table. The original write is not
    /// retried.
    pub(crate) fn persist(&self, state: &mut State, allow_reclaim: bool) -> SaveOutcome {
        let json = match encode_table(&state.table) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to encode contract id mappings: {}", e);
                return SaveOutcome::Failed;
            }
        };

        match self.backend.set_item(&self.options.keys.mappings, &json) {
            Ok(()) => {
                if let Err(e) = self
                    .backend
                    .set_item(&self.options.keys.version, escrowmap_core::SCHEMA_VERSION)
                {
                    warn!("Failed to write schema marker: {}", e);
                }
                SaveOutcome::Saved
            }
            Err(e) if e.is_quota_exceeded() && allow_reclaim => {
                warn!("Storage quota exceeded, pruning old mappings: {}", e);
                let removed = self.prune(state);
                let persisted = self.persist(state, false).is_persisted();
                info!(
                    "Pruned {} old mappings after quota error (persisted: {})",
                    removed, persisted
                );
                SaveOutcome::Reclaimed { removed, persisted }
            }
            Err(e) => {
                error!("Failed to save contract id mappings: {}", e);
                SaveOutcome::Failed
            }
        }
    }
}

impl<S: KeyValueStore> std::fmt::Debug for MappingStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MappingStore")
            .field("mappings", &state.table.len())
            .field("next_contract_id", &state.next_contract_id)
            .field("options", &self.options)
            .finish()
    }
}
