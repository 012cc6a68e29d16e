//! Advisory next-escrow-id counter
//!
//! The counter suggests a fresh escrow id to callers that need one. It does
//! not enforce uniqueness of `blockchain_id` across mappings; it only
//! guarantees it stays above every id passed through `set_mapping`.

use crate::store::{MappingStore, State};
use escrowmap_core::MAX_SAFE_INTEGER;
use escrowmap_storage::KeyValueStore;
use escrowmap_wire::encode_counter;
use tracing::warn;

impl<S: KeyValueStore> MappingStore<S> {
    /// Current counter value, 1 for an empty store
    pub fn next_contract_id(&self) -> u64 {
        self.lock().next_contract_id
    }

    /// Advance the counter past `used_id`
    ///
    /// Sets the counter to `max(current, used_id + 1)`. Writes only when the
    /// value changes. Ids above [`MAX_SAFE_INTEGER`] are not valid escrow ids
    /// and are ignored. Returns the counter after the call.
    pub fn update_next_contract_id(&self, used_id: u64) -> u64 {
        let mut state = self.lock();
        if used_id > MAX_SAFE_INTEGER {
            warn!(
                "Ignoring escrow id {} above {}; counter stays at {}",
                used_id, MAX_SAFE_INTEGER, state.next_contract_id
            );
            return state.next_contract_id;
        }
        self.advance_counter(&mut state, used_id)
    }

    /// `used_id` must be at most `MAX_SAFE_INTEGER`
    pub(crate) fn advance_counter(&self, state: &mut State, used_id: u64) -> u64 {
        let candidate = used_id + 1;
        if candidate > state.next_contract_id {
            state.next_contract_id = candidate;
            self.persist_counter(state);
        }
        state.next_contract_id
    }

    /// Set the counter unconditionally (explicit import)
    pub(crate) fn adopt_counter(&self, state: &mut State, value: u64) {
        state.next_contract_id = value;
        self.persist_counter(state);
    }

    fn persist_counter(&self, state: &State) {
        if let Err(e) = self.backend.set_item(
            &self.options.keys.next_contract_id,
            &encode_counter(state.next_contract_id),
        ) {
            warn!(
                "Failed to persist next contract id {}: {}",
                state.next_contract_id, e
            );
        }
    }
}
