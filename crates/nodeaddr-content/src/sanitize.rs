//! Strip runtime-only state before a document goes back to a library.
//!
//! Instances exist only while a job is being filled in. Library and template
//! definitions never carry them, so saving a filled-in tree as a reusable
//! definition must remove them at every depth and re-check the result.

use serde_json::{Map, Value};

use crate::contract::{ContentKind, ContractViolation, validate_content};

/// Keys that only exist at runtime.
pub const RUNTIME_KEYS: [&str; 3] = ["instances", "item_instance_id", "section_instance_id"];

/// Sanitize `doc` as a `kind` document and validate the result.
///
/// Only form documents carry runtime state; media and group documents pass
/// through unchanged (but are still checked).
pub fn sanitize_for_library(kind: ContentKind, doc: &Value) -> Result<Value, ContractViolation> {
    let out = match kind {
        ContentKind::Form => strip_form(doc),
        ContentKind::Media | ContentKind::Group => doc.clone(),
    };
    validate_content(kind, &out)?;
    Ok(out)
}

/// Remove runtime keys from a form document without validating it.
pub fn strip_form(doc: &Value) -> Value {
    let Value::Object(map) = doc else {
        return doc.clone();
    };
    let mut out = map.clone();
    if let Some(items) = out.get_mut("items") {
        *items = strip_items(items);
    }
    Value::Object(out)
}

fn strip_items(items: &Value) -> Value {
    match items {
        Value::Array(list) => Value::Array(list.iter().map(strip_item).collect()),
        other => other.clone(),
    }
}

fn strip_item(item: &Value) -> Value {
    let Value::Object(map) = item else {
        return item.clone();
    };

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        if RUNTIME_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "children" | "subsections" => strip_items(value),
            _ => value.clone(),
        };
        out.insert(key.clone(), value);
    }
    Value::Object(out)
}

/// True when any runtime key appears anywhere in `value`.
pub fn has_runtime_state(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| RUNTIME_KEYS.contains(&k.as_str()) || has_runtime_state(v)),
        Value::Array(list) => list.iter().any(has_runtime_state),
        _ => false,
    }
}
