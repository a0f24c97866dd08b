//! Canonical JSON: object keys deep-sorted, arrays in order, no whitespace.
//!
//! Two documents that differ only in key order or formatting canonicalize to
//! the same bytes, which is what fingerprints hash.

use serde::Serialize;
use serde_json::{Map, Value};

/// Canonical JSON bytes of any serializable value.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let canon = canonicalize(serde_json::to_value(value)?);
    serde_json::to_vec(&canon)
}

/// Canonical JSON text of a value already in memory.
pub fn canonical_string(value: &Value) -> String {
    canonicalize(value.clone()).to_string()
}

/// Deep-sort object keys.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(list) => Value::Array(list.into_iter().map(canonicalize).collect()),
        scalar => scalar,
    }
}
