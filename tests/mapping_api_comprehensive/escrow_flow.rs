//! Escrow Registration Flow Tests
//!
//! Reserve → confirm / fail against a simulated escrow contract.

use crate::*;
use parking_lot::Mutex;

/// Escrow contract that hands out sequential ids
#[derive(Default)]
struct SimulatedEscrow {
    latest: Mutex<Option<u64>>,
    offline: Mutex<bool>,
}

impl SimulatedEscrow {
    /// Mine a registration, returning the id the contract assigned
    fn register(&self) -> u64 {
        let mut latest = self.latest.lock();
        let id = latest.map_or(1, |id| id + 1);
        *latest = Some(id);
        id
    }
}

impl EscrowChain for SimulatedEscrow {
    fn latest_escrow_id(&self) -> std::result::Result<Option<u64>, ChainError> {
        if *self.offline.lock() {
            return Err(ChainError::Unavailable("rpc timeout".into()));
        }
        Ok(*self.latest.lock())
    }
}

#[test]
fn test_reserve_then_confirm() {
    let (_, map) = create_map();
    let chain = SimulatedEscrow::default();
    let registrar = map.registrar(&chain);

    let reserved = registrar.reserve("order-1", Some("0xaaa")).unwrap();
    assert_eq!(reserved.blockchain_id, 1);
    assert_eq!(reserved.status, MappingStatus::Pending);

    let assigned = chain.register();
    assert!(registrar.confirm("order-1", Some(assigned), None).unwrap());

    let mapping = map.mapping("order-1").unwrap();
    assert_eq!(mapping.status, MappingStatus::Confirmed);
    assert_eq!(mapping.blockchain_id, 1);
    assert_eq!(mapping.transaction_hash.as_deref(), Some("0xaaa"));
    assert_eq!(registrar.resolve("order-1"), Some(1));
}

#[test]
fn test_race_between_two_registrations() {
    let (_, map) = create_map();
    let chain = SimulatedEscrow::default();
    let registrar = map.registrar(&chain);

    // Both reserve before either is mined; the local counter separates them
    let a = registrar.reserve("a", None).unwrap();
    let b = registrar.reserve("b", None).unwrap();
    assert_eq!((a.blockchain_id, b.blockchain_id), (1, 2));

    // Mined in reverse order
    let b_id = chain.register();
    let a_id = chain.register();
    registrar.confirm("b", Some(b_id), None).unwrap();
    registrar.confirm("a", Some(a_id), None).unwrap();

    assert_eq!(registrar.resolve("a"), Some(2));
    assert_eq!(registrar.resolve("b"), Some(1));
    assert_eq!(map.stats().confirmed, 2);
    assert!(map.next_contract_id() > 2);
}

#[test]
fn test_failed_registration() {
    let (_, map) = create_map();
    let chain = SimulatedEscrow::default();
    let registrar = map.registrar(&chain);

    registrar.reserve("doomed", Some("0xbad")).unwrap();
    assert!(registrar.fail("doomed", None));

    let mapping = map.mapping("doomed").unwrap();
    assert_eq!(mapping.status, MappingStatus::Failed);
    assert_eq!(mapping.transaction_hash.as_deref(), Some("0xbad"));
}

#[test]
fn test_offline_chain_uses_local_counter() {
    let (_, map) = create_map();
    map.set_mapping("earlier", 41, None, None).unwrap();

    let chain = SimulatedEscrow::default();
    *chain.offline.lock() = true;
    let registrar = map.registrar(&chain);
    assert_eq!(registrar.reserve("next", None).unwrap().blockchain_id, 42);
}

#[test]
fn test_stuck_reservations_found_for_reconciliation() {
    let (clock, map) = create_map();
    let chain = SimulatedEscrow::default();
    let registrar = map.registrar(&chain);

    registrar.reserve("slow", None).unwrap();
    clock.advance(2 * DAY);
    registrar.reserve("quick", None).unwrap();

    let stuck = map.pending_older_than(std::time::Duration::from_secs(24 * 3600));
    assert_eq!(stuck.len(), 1);
    assert_eq!(stuck[0].contract_id, "slow");

    // Stuck reservations survive pruning however old they are
    clock.advance(90 * DAY);
    map.clear_old_mappings();
    assert!(map.mapping("slow").is_some());
}
