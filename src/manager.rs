//! Main entry point for escrowmap.
//!
//! This module provides [`EscrowMap`], the contract-id manager, and
//! [`EscrowMapBuilder`] for configuring how it is opened.

use crate::error::{Error, Result};
use escrowmap_config::OpenOptions;
use escrowmap_core::{Clock, ContractIdMapping, MappingStats, MappingStatus, MappingTable, SystemClock};
use escrowmap_engine::{
    DebugDump, EscrowChain, EscrowRegistrar, ImportReport, LoadReport, MappingStore, SaveOutcome,
};
use escrowmap_storage::{FileStore, KeyValueStore, MemoryStore, SyncMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Backend type used by the facade
pub type DynStore = Box<dyn KeyValueStore>;

/// The contract-id manager.
///
/// Maps application contract ids to on-chain escrow ids, tracks each
/// mapping's lifecycle, keeps the advisory next-id counter and prunes old
/// mappings. Create one with [`EscrowMap::open`], [`EscrowMap::ephemeral`]
/// or [`EscrowMap::builder`].
///
/// # Example
///
/// ```
/// use escrowmap::prelude::*;
///
/// let map = EscrowMap::ephemeral()?;
/// map.set_mapping("order-42", 7, None, Some(MappingStatus::Pending))?;
/// map.update_mapping_status("order-42", MappingStatus::Confirmed, Some("0xabc"));
///
/// assert_eq!(map.blockchain_id("order-42"), Some(7));
/// assert_eq!(map.next_contract_id(), 8);
/// # Ok::<(), escrowmap::Error>(())
/// ```
pub struct EscrowMap {
    inner: MappingStore<DynStore>,
    path: Option<PathBuf>,
}

impl EscrowMap {
    /// Open a file-backed manager at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an in-memory manager. Nothing touches disk.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().open()
    }

    /// Open a manager over a caller-supplied backend.
    pub fn with_backend(backend: impl KeyValueStore + 'static, options: OpenOptions) -> Result<Self> {
        Self::builder().options(options).backend(backend).open()
    }

    /// Create a builder.
    ///
    /// ```
    /// use escrowmap::prelude::*;
    ///
    /// let map = EscrowMap::builder()
    ///     .options(OpenOptions::new().retention(RetentionPolicy::days(7)))
    ///     .open()?;
    /// assert_eq!(map.options().retention.max_age_days, 7);
    /// # Ok::<(), escrowmap::Error>(())
    /// ```
    pub fn builder() -> EscrowMapBuilder {
        EscrowMapBuilder::new()
    }

    /// Directory of a file-backed manager, `None` when ephemeral.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Options in effect.
    pub fn options(&self) -> &OpenOptions {
        self.inner.options()
    }

    /// Underlying mapping store.
    pub fn store(&self) -> &MappingStore<DynStore> {
        &self.inner
    }

    // =========================================================================
    // Mappings
    // =========================================================================

    /// Create or overwrite the mapping for `contract_id`.
    ///
    /// `status` defaults to confirmed. Advances the next-id counter past
    /// `blockchain_id`.
    pub fn set_mapping(
        &self,
        contract_id: &str,
        blockchain_id: u64,
        transaction_hash: Option<&str>,
        status: Option<MappingStatus>,
    ) -> Result<ContractIdMapping> {
        Ok(self
            .inner
            .set_mapping(contract_id, blockchain_id, transaction_hash, status)?)
    }

    /// Escrow id for `contract_id`, `None` if unmapped.
    pub fn blockchain_id(&self, contract_id: &str) -> Option<u64> {
        self.inner.blockchain_id(contract_id)
    }

    /// Full record for `contract_id`.
    pub fn mapping(&self, contract_id: &str) -> Option<ContractIdMapping> {
        self.inner.mapping(contract_id)
    }

    /// Contract ids mapped to `blockchain_id`.
    pub fn contract_ids_by_blockchain_id(&self, blockchain_id: u64) -> Vec<String> {
        self.inner.contract_ids_by_blockchain_id(blockchain_id)
    }

    /// Every mapping, newest first.
    pub fn all_mappings(&self) -> Vec<ContractIdMapping> {
        self.inner.all_mappings()
    }

    /// Change the status of an existing mapping. `false` if unknown.
    pub fn update_mapping_status(
        &self,
        contract_id: &str,
        status: MappingStatus,
        transaction_hash: Option<&str>,
    ) -> bool {
        self.inner
            .update_mapping_status(contract_id, status, transaction_hash)
    }

    /// Remove one mapping. `false` if unknown.
    pub fn remove_mapping(&self, contract_id: &str) -> bool {
        self.inner.remove_mapping(contract_id)
    }

    /// Snapshot of the whole table.
    pub fn get_mappings(&self) -> MappingTable {
        self.inner.get_mappings()
    }

    /// Replace the whole table.
    pub fn save_mappings(&self, table: MappingTable) -> SaveOutcome {
        self.inner.save_mappings(table)
    }

    // =========================================================================
    // Counter
    // =========================================================================

    /// Advisory next escrow id.
    pub fn next_contract_id(&self) -> u64 {
        self.inner.next_contract_id()
    }

    /// Advance the counter past `used_id`; returns the new value.
    pub fn update_next_contract_id(&self, used_id: u64) -> u64 {
        self.inner.update_next_contract_id(used_id)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Prune settled mappings past the retention window.
    pub fn clear_old_mappings(&self) -> usize {
        self.inner.clear_old_mappings()
    }

    /// Pending mappings older than `age`, oldest first.
    pub fn pending_older_than(&self, age: Duration) -> Vec<ContractIdMapping> {
        self.inner.pending_older_than(age)
    }

    /// Remove every mapping, the counter and the schema marker.
    pub fn clear_all_mappings(&self) {
        self.inner.clear_all_mappings()
    }

    /// Re-read everything from the backend.
    pub fn reload(&self) -> LoadReport {
        self.inner.reload()
    }

    /// Counts per status.
    pub fn stats(&self) -> MappingStats {
        self.inner.stats()
    }

    /// Collect and log diagnostics.
    pub fn debug_dump(&self) -> DebugDump {
        self.inner.debug_dump()
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    /// Export the whole store as a JSON document.
    pub fn export_mappings(&self) -> Result<String> {
        Ok(self.inner.export_mappings()?)
    }

    /// Replace the store with the contents of an export document.
    pub fn import_mappings(&self, json: &str) -> Result<ImportReport> {
        Ok(self.inner.import_mappings(json)?)
    }

    /// Registration flow against `chain`.
    pub fn registrar<'a, C: EscrowChain + ?Sized>(
        &'a self,
        chain: &'a C,
    ) -> EscrowRegistrar<'a, DynStore, C> {
        EscrowRegistrar::new(&self.inner, chain)
    }
}

impl std::fmt::Debug for EscrowMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowMap")
            .field("path", &self.path)
            .field("store", &self.inner)
            .finish()
    }
}

/// Builder for [`EscrowMap`].
///
/// # Example
///
/// ```no_run
/// use escrowmap::prelude::*;
///
/// // Disk-backed, options from a TOML file
/// let map = EscrowMap::builder()
///     .path("./escrow-data")
///     .config_file("./escrowmap.toml")
///     .open()?;
///
/// // In memory with a small quota
/// let map = EscrowMap::builder()
///     .options(OpenOptions::new().quota_bytes(4096))
///     .open()?;
/// # Ok::<(), escrowmap::Error>(())
/// ```
pub struct EscrowMapBuilder {
    path: Option<PathBuf>,
    config_file: Option<PathBuf>,
    options: OpenOptions,
    sync: SyncMode,
    clock: Arc<dyn Clock>,
    backend: Option<DynStore>,
}

impl EscrowMapBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            config_file: None,
            options: OpenOptions::default(),
            sync: SyncMode::default(),
            clock: Arc::new(SystemClock),
            backend: None,
        }
    }

    /// Store mappings as files under `path`.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use these options.
    pub fn options(mut self, options: OpenOptions) -> Self {
        self.options = options;
        self
    }

    /// Load options from a TOML file at open time, replacing any set with
    /// [`options`](Self::options).
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skip fsync on file writes.
    pub fn no_sync(mut self) -> Self {
        self.sync = SyncMode::None;
        self
    }

    /// Use a custom clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a caller-supplied backend. Takes precedence over `path`; the
    /// quota option does not apply.
    pub fn backend(mut self, backend: impl KeyValueStore + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Open the manager.
    ///
    /// Without a path or backend the manager is in-memory.
    pub fn open(self) -> Result<EscrowMap> {
        let options = match &self.config_file {
            Some(file) => OpenOptions::from_toml_file(file)?,
            None => self.options,
        };
        options.validate()?;

        let backend: DynStore = match (self.backend, &self.path) {
            (Some(backend), _) => backend,
            (None, Some(path)) => {
                let mut store = FileStore::open(path)?.sync_mode(self.sync);
                if let Some(limit) = options.quota_bytes {
                    store = store.quota(limit);
                }
                Box::new(store)
            }
            (None, None) => Box::new(match options.quota_bytes {
                Some(limit) => MemoryStore::with_quota(limit),
                None => MemoryStore::new(),
            }),
        };

        let inner = MappingStore::open_with_clock(backend, options, self.clock);
        let report = inner.last_load();
        info!(
            "Opened contract id mappings ({} loaded, {} dropped) at {}",
            report.kept,
            report.dropped,
            self.path
                .as_deref()
                .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
        );
        Ok(EscrowMap {
            inner,
            path: self.path,
        })
    }
}

impl Default for EscrowMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
