//! Retention pruning
//!
//! Settled mappings (confirmed or failed) older than the retention window are
//! removed. Pending mappings are never removed, whatever their age, so an
//! in-flight transaction can always be reconciled.

use crate::store::{MappingStore, State};
use escrowmap_core::ContractIdMapping;
use escrowmap_storage::KeyValueStore;
use std::time::Duration;
use tracing::info;

impl<S: KeyValueStore> MappingStore<S> {
    /// Remove settled mappings older than the retention window
    ///
    /// Persists the remaining table and returns the number removed. This is
    /// the same routine the save path runs when the backend reports its quota
    /// is exhausted.
    pub fn clear_old_mappings(&self) -> usize {
        let mut state = self.lock();
        let removed = self.prune(&mut state);
        // A quota error here must not re-enter the reclaimer
        self.persist(&mut state, false);
        if removed > 0 {
            info!("Cleared {} old contract id mappings", removed);
        }
        removed
    }

    /// Pending mappings outstanding for longer than `age`, oldest first
    ///
    /// These are the candidates for reconciliation against the chain.
    pub fn pending_older_than(&self, age: Duration) -> Vec<ContractIdMapping> {
        let age_millis = i64::try_from(age.as_millis()).unwrap_or(i64::MAX);
        let now = self.now();
        let state = self.lock();
        let mut stale: Vec<ContractIdMapping> = state
            .table
            .values()
            .filter(|m| m.status.is_pending() && m.age_millis(now) > age_millis)
            .cloned()
            .collect();
        stale.sort_by_key(|m| m.created_at);
        stale
    }

    pub(crate) fn prune(&self, state: &mut State) -> usize {
        let cutoff = self.options.retention.max_age_millis();
        let now = self.now();
        let before = state.table.len();
        state
            .table
            .retain(|_, m| m.status.is_pending() || m.age_millis(now) <= cutoff);
        before - state.table.len()
    }
}
