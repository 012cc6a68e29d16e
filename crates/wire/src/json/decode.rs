//! JSON decoding for tables, counters and import documents
//!
//! Decoding is split in two levels:
//! - document level: syntax and top-level shape, reported as [`DecodeError`]
//! - record level: each pair validated independently, bad pairs collected as
//!   [`RejectedRecord`] while the good ones are kept

use super::error::DecodeError;
use escrowmap_core::{validate_pair, MappingTable, RecordError, Timestamp, MAX_SAFE_INTEGER};

/// Largest counter value: one past the largest valid id
const MAX_COUNTER: u64 = MAX_SAFE_INTEGER + 1;
use serde_json::Value;

/// A pair that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position in the pair array
    pub index: usize,
    /// Pair key, when it was a string
    pub key: Option<String>,
    /// Why it was rejected
    pub reason: RecordError,
}

/// Decoded table plus the pairs that were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedTable {
    /// Valid mappings
    pub table: MappingTable,
    /// Dropped pairs
    pub rejected: Vec<RejectedRecord>,
}

/// Decoded import document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportDocument {
    /// `version` field, if it was a string
    pub version: Option<String>,
    /// `exportedAt` field, if it was an integer
    pub exported_at: Option<Timestamp>,
    /// `nextContractId`, if it was a positive integer
    pub next_contract_id: Option<u64>,
    /// Valid mappings
    pub table: MappingTable,
    /// Dropped pairs
    pub rejected: Vec<RejectedRecord>,
}

/// Decode a persisted table document
///
/// Fails only when the text is not JSON or not an array. Later pairs with a
/// duplicate key overwrite earlier ones.
pub fn decode_table(json: &str) -> Result<DecodedTable, DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(pairs) => Ok(decode_pairs(&pairs)),
        _ => Err(DecodeError::InvalidFormat(
            "mapping table must be an array".to_string(),
        )),
    }
}

/// Decode an import document
///
/// The document must be a JSON object whose `mappings` field is an array.
/// Other fields are optional; unusable values are ignored.
pub fn decode_import(json: &str) -> Result<ImportDocument, DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    let obj = match value {
        Value::Object(map) => map,
        _ => {
            return Err(DecodeError::InvalidFormat(
                "import document must be an object".to_string(),
            ))
        }
    };

    let pairs = match obj.get("mappings") {
        Some(Value::Array(pairs)) => pairs,
        Some(_) => {
            return Err(DecodeError::InvalidFormat(
                "`mappings` must be an array".to_string(),
            ))
        }
        None => {
            return Err(DecodeError::InvalidFormat(
                "missing `mappings` array".to_string(),
            ))
        }
    };

    let decoded = decode_pairs(pairs);

    let version = match obj.get("version") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    let exported_at = obj.get("exportedAt").and_then(Value::as_i64);
    let next_contract_id = obj.get("nextContractId").and_then(positive_integer);

    Ok(ImportDocument {
        version,
        exported_at,
        next_contract_id,
        table: decoded.table,
        rejected: decoded.rejected,
    })
}

/// Decode the stored next-id counter
///
/// Returns `None` when absent, not a positive integer, or past the largest
/// value a valid id can push the counter to.
pub fn decode_counter(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n > 0 && n <= MAX_COUNTER)
}

fn decode_pairs(pairs: &[Value]) -> DecodedTable {
    let mut out = DecodedTable::default();
    for (index, pair) in pairs.iter().enumerate() {
        match validate_pair(pair) {
            Ok(mapping) => {
                out.table.insert(mapping.contract_id.clone(), mapping);
            }
            Err(reason) => {
                let key = pair
                    .get(0)
                    .and_then(Value::as_str)
                    .map(str::to_string);
                out.rejected.push(RejectedRecord { index, key, reason });
            }
        }
    }
    out
}

fn positive_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return (n > 0 && n <= MAX_COUNTER).then_some(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= MAX_COUNTER as f64 => Some(f as u64),
        _ => None,
    }
}
