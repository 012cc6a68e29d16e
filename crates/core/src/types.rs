//! Mapping data model
//!
//! A [`ContractIdMapping`] associates one application-level contract id with
//! the sequential integer id assigned by the on-chain escrow factory, plus
//! lifecycle metadata. Field names serialize in camelCase to stay compatible
//! with documents written by the web client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Mapping table keyed by contract id.
///
/// Iteration order is not meaningful; lookups are by key.
pub type MappingTable = BTreeMap<String, ContractIdMapping>;

/// Lifecycle state of a mapping
///
/// - Pending: the establishing transaction was submitted but has no result yet
/// - Confirmed: the transaction succeeded (also the default for new mappings)
/// - Failed: the transaction failed
///
/// Transitions are not constrained; callers decide which moves are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    /// Transaction submitted, outcome unknown
    Pending,
    /// Transaction succeeded
    #[default]
    Confirmed,
    /// Transaction failed
    Failed,
}

impl MappingStatus {
    /// All states, in display order.
    pub const ALL: [MappingStatus; 3] = [
        MappingStatus::Pending,
        MappingStatus::Confirmed,
        MappingStatus::Failed,
    ];

    /// Check if the mapping is waiting on a transaction
    pub fn is_pending(&self) -> bool {
        matches!(self, MappingStatus::Pending)
    }

    /// Check if the mapping is confirmed
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MappingStatus::Confirmed)
    }

    /// Check if the mapping failed
    pub fn is_failed(&self) -> bool {
        matches!(self, MappingStatus::Failed)
    }

    /// Get string representation (matches the persisted form)
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Pending => "pending",
            MappingStatus::Confirmed => "confirmed",
            MappingStatus::Failed => "failed",
        }
    }

    /// Parse the persisted form. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MappingStatus::Pending),
            "confirmed" => Some(MappingStatus::Confirmed),
            "failed" => Some(MappingStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One application contract mapped to one on-chain escrow id
///
/// # Examples
///
/// ```
/// use escrowmap_core::{ContractIdMapping, MappingStatus};
///
/// let mapping = ContractIdMapping::new("order-42", 7, 1_700_000_000_000);
/// assert_eq!(mapping.status, MappingStatus::Confirmed);
/// assert!(mapping.transaction_hash.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractIdMapping {
    /// Application-level contract id (unique key)
    pub contract_id: String,
    /// On-chain sequential escrow id
    pub blockchain_id: u64,
    /// Creation time, epoch milliseconds
    pub created_at: Timestamp,
    /// Transaction that created or last updated the mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Lifecycle state
    #[serde(default)]
    pub status: MappingStatus,
}

impl ContractIdMapping {
    /// Create a confirmed mapping with no transaction reference
    pub fn new(contract_id: impl Into<String>, blockchain_id: u64, created_at: Timestamp) -> Self {
        ContractIdMapping {
            contract_id: contract_id.into(),
            blockchain_id,
            created_at,
            transaction_hash: None,
            status: MappingStatus::Confirmed,
        }
    }

    /// Set the transaction reference
    pub fn with_transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    /// Set the lifecycle state
    pub fn with_status(mut self, status: MappingStatus) -> Self {
        self.status = status;
        self
    }

    /// Age of the mapping relative to `now`, in milliseconds.
    ///
    /// Negative when `created_at` lies in the future (clock skew).
    pub fn age_millis(&self, now: Timestamp) -> i64 {
        now.saturating_sub(self.created_at)
    }
}

/// Aggregate counts for diagnostic display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingStats {
    /// Number of mappings
    pub total: usize,
    /// Mappings in `Pending`
    pub pending: usize,
    /// Mappings in `Confirmed`
    pub confirmed: usize,
    /// Mappings in `Failed`
    pub failed: usize,
    /// Current advisory counter value
    pub next_contract_id: u64,
    /// Oldest `created_at`, if any mapping exists
    pub oldest_created_at: Option<Timestamp>,
    /// Newest `created_at`, if any mapping exists
    pub newest_created_at: Option<Timestamp>,
}

impl MappingStats {
    /// Compute stats over a table
    pub fn collect<'a>(
        mappings: impl IntoIterator<Item = &'a ContractIdMapping>,
        next_contract_id: u64,
    ) -> Self {
        let mut stats = MappingStats {
            next_contract_id,
            ..Default::default()
        };
        for mapping in mappings {
            stats.total += 1;
            match mapping.status {
                MappingStatus::Pending => stats.pending += 1,
                MappingStatus::Confirmed => stats.confirmed += 1,
                MappingStatus::Failed => stats.failed += 1,
            }
            stats.oldest_created_at = Some(match stats.oldest_created_at {
                Some(t) => t.min(mapping.created_at),
                None => mapping.created_at,
            });
            stats.newest_created_at = Some(match stats.newest_created_at {
                Some(t) => t.max(mapping.created_at),
                None => mapping.created_at,
            });
        }
        stats
    }
}
