//! Schema version marker
//!
//! The marker is a plain string stored next to the table. There is no
//! migration: a mismatch is reported to the caller, which logs it and keeps
//! going.

use escrowmap_core::SCHEMA_VERSION;

/// Outcome of comparing the stored marker with [`SCHEMA_VERSION`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    /// No marker stored (fresh store)
    Fresh,
    /// Marker equals the current version
    Current,
    /// Marker differs from the current version
    Mismatch {
        /// The stored marker
        stored: String,
    },
}

impl SchemaCheck {
    /// Check if the marker differs from the current version
    pub fn is_mismatch(&self) -> bool {
        matches!(self, SchemaCheck::Mismatch { .. })
    }
}

/// Compare a stored marker against the current schema version
pub fn check_schema(stored: Option<&str>) -> SchemaCheck {
    match stored {
        None => SchemaCheck::Fresh,
        Some(v) if v == SCHEMA_VERSION => SchemaCheck::Current,
        Some(v) => SchemaCheck::Mismatch {
            stored: v.to_string(),
        },
    }
}
