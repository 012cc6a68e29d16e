//! Wire encoding for escrowmap
//!
//! This crate implements the persisted and transportable JSON forms:
//!
//! | Document | JSON Encoding |
//! |----------|---------------|
//! | Mapping table | `[["<contractId>", {mapping}], ...]` |
//! | Next-id counter | decimal string, e.g. `"8"` |
//! | Schema marker | version string, e.g. `"1.0"` |
//! | Export | `{"version", "exportedAt", "nextContractId", "mappings"}` |
//!
//! Decoding never fails because of a single bad record: records are
//! validated one by one and rejected records are reported next to the
//! decoded table.
//!
//! ## Examples
//!
//! ```
//! use escrowmap_core::{ContractIdMapping, MappingTable};
//! use escrowmap_wire::{decode_table, encode_table};
//!
//! let mut table = MappingTable::new();
//! table.insert("c1".into(), ContractIdMapping::new("c1", 3, 1_000));
//!
//! let json = encode_table(&table).unwrap();
//! let decoded = decode_table(&json).unwrap();
//! assert_eq!(decoded.table, table);
//! assert!(decoded.rejected.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod json;

// Re-export main types
pub use json::{
    check_schema, decode_counter, decode_import, decode_table, encode_counter, encode_export,
    encode_table, DecodeError, DecodedTable, ExportDocument, ImportDocument, RejectedRecord,
    SchemaCheck,
};
