//! JSON wire encoding for mapping tables and export documents

mod decode;
mod encode;
mod error;
mod version;

pub use decode::{decode_counter, decode_import, decode_table, DecodedTable, ImportDocument, RejectedRecord};
pub use encode::{encode_counter, encode_export, encode_table, ExportDocument};
pub use error::DecodeError;
pub use version::{check_schema, SchemaCheck};
