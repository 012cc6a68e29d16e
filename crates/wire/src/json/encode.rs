//! JSON encoding for tables, counters and export documents

use escrowmap_core::{ContractIdMapping, MappingTable, Timestamp, SCHEMA_VERSION};
use serde::Serialize;

/// Encode a table as an array of `[contractId, mapping]` pairs
pub fn encode_table(table: &MappingTable) -> Result<String, serde_json::Error> {
    let pairs: Vec<(&String, &ContractIdMapping)> = table.iter().collect();
    serde_json::to_string(&pairs)
}

/// Encode the next-id counter
pub fn encode_counter(next_contract_id: u64) -> String {
    next_contract_id.to_string()
}

/// Whole-store snapshot for backup or migration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Schema version of the exporting store
    pub version: String,
    /// Export time, epoch milliseconds
    pub exported_at: Timestamp,
    /// Counter value at export time
    pub next_contract_id: u64,
    /// `[contractId, mapping]` pairs
    pub mappings: Vec<(String, ContractIdMapping)>,
}

impl ExportDocument {
    /// Snapshot `table` at the current schema version
    pub fn new(table: &MappingTable, next_contract_id: u64, exported_at: Timestamp) -> Self {
        ExportDocument {
            version: SCHEMA_VERSION.to_string(),
            exported_at,
            next_contract_id,
            mappings: table
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Encode an export document (pretty-printed)
pub fn encode_export(doc: &ExportDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
