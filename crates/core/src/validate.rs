//! Record validation
//!
//! Every record read from storage or an import document passes through
//! [`validate_pair`]. Validation works on untyped JSON so that one bad field
//! rejects one record instead of failing deserialization of the whole table.
//!
//! Accepted shape:
//!
//! | Field | Rule |
//! |-------|------|
//! | `contractId` | non-empty string, equal to the pair key |
//! | `blockchainId` | integer in `1..=MAX_SAFE_INTEGER` (`7.0` is accepted as `7`) |
//! | `createdAt` | integer in `1..=MAX_SAFE_INTEGER` |
//! | `transactionHash` | string, `null` or absent |
//! | `status` | `"pending"`, `"confirmed"`, `"failed"`, `null` or absent |
//!
//! Records built in memory are held to the same rules by
//! [`validate_mapping`] before they are written.

use crate::error::RecordError;
use crate::types::{ContractIdMapping, MappingStatus};
use crate::MAX_SAFE_INTEGER;
use serde_json::{Map, Value};

/// Validate one `[contractId, mapping]` pair
pub fn validate_pair(pair: &Value) -> Result<ContractIdMapping, RecordError> {
    let items = match pair {
        Value::Array(items) if items.len() == 2 => items,
        Value::Array(items) => {
            return Err(RecordError::MalformedPair(format!(
                "expected 2 elements, got {}",
                items.len()
            )))
        }
        other => {
            return Err(RecordError::MalformedPair(format!(
                "expected array, got {}",
                json_type_name(other)
            )))
        }
    };

    let key = match &items[0] {
        Value::String(s) => s.as_str(),
        other => {
            return Err(RecordError::MalformedPair(format!(
                "key must be a string, got {}",
                json_type_name(other)
            )))
        }
    };

    validate_record(key, &items[1])
}

/// Validate a mapping record stored under `key`
pub fn validate_record(key: &str, record: &Value) -> Result<ContractIdMapping, RecordError> {
    let obj = match record {
        Value::Object(map) => map,
        _ => return Err(RecordError::NotAnObject),
    };

    let contract_id = match obj.get("contractId") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) => {
            return Err(RecordError::InvalidField {
                field: "contractId",
                reason: "must not be empty".to_string(),
            })
        }
        Some(other) => {
            return Err(RecordError::InvalidField {
                field: "contractId",
                reason: format!("expected string, got {}", json_type_name(other)),
            })
        }
        None => return Err(RecordError::MissingField("contractId")),
    };

    if contract_id != key {
        return Err(RecordError::KeyMismatch {
            key: key.to_string(),
            contract_id,
        });
    }

    let blockchain_id = positive_integer(obj, "blockchainId")?;
    let created_at = positive_integer(obj, "createdAt")?;
    let created_at = i64::try_from(created_at).map_err(|_| RecordError::InvalidField {
        field: "createdAt",
        reason: "out of range".to_string(),
    })?;

    let transaction_hash = match obj.get("transactionHash") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(RecordError::InvalidField {
                field: "transactionHash",
                reason: format!("expected string, got {}", json_type_name(other)),
            })
        }
    };

    let status = match obj.get("status") {
        None | Some(Value::Null) => MappingStatus::default(),
        Some(Value::String(s)) => {
            MappingStatus::parse(s).ok_or_else(|| RecordError::InvalidField {
                field: "status",
                reason: format!("unknown status `{}`", s),
            })?
        }
        Some(other) => {
            return Err(RecordError::InvalidField {
                field: "status",
                reason: format!("expected string, got {}", json_type_name(other)),
            })
        }
    };

    Ok(ContractIdMapping {
        contract_id,
        blockchain_id,
        created_at,
        transaction_hash,
        status,
    })
}

/// Check a typed record against the rules applied on load
///
/// A record that passes here survives a save followed by a load unchanged.
pub fn validate_mapping(key: &str, mapping: &ContractIdMapping) -> Result<(), RecordError> {
    if mapping.contract_id.is_empty() {
        return Err(RecordError::InvalidField {
            field: "contractId",
            reason: "must not be empty".to_string(),
        });
    }
    if mapping.contract_id != key {
        return Err(RecordError::KeyMismatch {
            key: key.to_string(),
            contract_id: mapping.contract_id.clone(),
        });
    }
    check_range("blockchainId", i128::from(mapping.blockchain_id))?;
    check_range("createdAt", i128::from(mapping.created_at))?;
    Ok(())
}

fn check_range(field: &'static str, value: i128) -> Result<(), RecordError> {
    if value < 1 {
        return Err(RecordError::InvalidField {
            field,
            reason: "must be positive".to_string(),
        });
    }
    if value > i128::from(MAX_SAFE_INTEGER) {
        return Err(RecordError::InvalidField {
            field,
            reason: format!("must not exceed {}", MAX_SAFE_INTEGER),
        });
    }
    Ok(())
}

fn positive_integer(obj: &Map<String, Value>, field: &'static str) -> Result<u64, RecordError> {
    let invalid = |reason: &str| RecordError::InvalidField {
        field,
        reason: reason.to_string(),
    };

    match obj.get(field) {
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                if v == 0 {
                    return Err(invalid("must be positive"));
                }
                if v > MAX_SAFE_INTEGER {
                    return Err(invalid("too large"));
                }
                return Ok(v);
            }
            if n.as_i64().is_some() {
                return Err(invalid("must be positive"));
            }
            // Integral floats such as 7.0 are written by some clients
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= MAX_SAFE_INTEGER as f64 => {
                    Ok(f as u64)
                }
                Some(f) if f.fract() == 0.0 && f >= 1.0 => Err(invalid("too large")),
                Some(f) if f.fract() == 0.0 => Err(invalid("must be positive")),
                _ => Err(invalid("must be an integer")),
            }
        }
        Some(other) => Err(RecordError::InvalidField {
            field,
            reason: format!("expected number, got {}", json_type_name(other)),
        }),
        None => Err(RecordError::MissingField(field)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
