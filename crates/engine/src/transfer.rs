//! Whole-store export and import
//!
//! Export produces a self-describing snapshot. Import replaces the table with
//! the validated contents of such a snapshot; it is the one operation that
//! rejects bad input outright, because the caller asked for a bulk replace
//! and needs to know it did not happen.

use crate::store::MappingStore;
use escrowmap_core::{Error, Result, SCHEMA_VERSION};
use escrowmap_storage::KeyValueStore;
use escrowmap_wire::{decode_import, encode_export, DecodeError, ExportDocument};
use tracing::{error, info, warn};

/// What an import changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Mappings now in the store
    pub imported: usize,
    /// Entries dropped by validation
    pub dropped: usize,
    /// Counter adopted from the document, if it carried a valid one
    pub next_contract_id: Option<u64>,
}

impl<S: KeyValueStore> MappingStore<S> {
    /// Serialize version, export time, counter and every mapping
    pub fn export_mappings(&self) -> Result<String> {
        let doc = {
            let state = self.lock();
            ExportDocument::new(&state.table, state.next_contract_id, self.now())
        };
        Ok(encode_export(&doc)?)
    }

    /// Replace the store with the contents of an export document
    ///
    /// Entries are validated exactly as on load; invalid ones are dropped.
    /// A valid `nextContractId` is adopted as-is, even if lower than the
    /// current counter.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidImport`] when the text is not JSON or has no
    /// `mappings` array. The store is left untouched.
    pub fn import_mappings(&self, json: &str) -> Result<ImportReport> {
        let doc = match decode_import(json) {
            Ok(doc) => doc,
            Err(e) => {
                error!("Failed to import contract id mappings: {}", e);
                return Err(match e {
                    DecodeError::InvalidFormat(detail) => {
                        Error::InvalidImport(format!("invalid import data format: {}", detail))
                    }
                    DecodeError::InvalidJson(detail) => {
                        Error::InvalidImport(format!("unparseable import document: {}", detail))
                    }
                });
            }
        };

        if let Some(version) = doc.version.as_deref().filter(|v| *v != SCHEMA_VERSION) {
            warn!(
                "Importing mappings exported at schema {}, current {}",
                version, SCHEMA_VERSION
            );
        }
        for rejected in &doc.rejected {
            warn!(
                "Skipping invalid imported mapping #{} ({}): {}",
                rejected.index,
                rejected.key.as_deref().unwrap_or("<no key>"),
                rejected.reason
            );
        }

        let report = ImportReport {
            imported: doc.table.len(),
            dropped: doc.rejected.len(),
            next_contract_id: doc.next_contract_id,
        };

        let mut state = self.lock();
        state.table = doc.table;
        self.persist(&mut state, true);
        if let Some(next) = doc.next_contract_id {
            self.adopt_counter(&mut state, next);
        }

        info!(
            "Imported {} contract id mappings ({} skipped)",
            report.imported, report.dropped
        );
        Ok(report)
    }
}
