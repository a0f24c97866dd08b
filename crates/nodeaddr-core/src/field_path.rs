//! Field and section path construction.
//!
//! A field path is the join key between form state (values keyed by path) and
//! the structural location of a field inside a content document:
//!
//! ```text
//! <ancestor>.<ref>[_<instance>][[<index>]]
//! ```
//!
//! Instance 1 is the implicit default and is never suffixed, so the path of a
//! non-repeated field equals the path of the first occurrence of a repeated one.

use serde::{Deserialize, Serialize};

/// Build the path of a field occurrence.
///
/// - `instance_id` is appended as `_<id>` only when it is greater than 1
/// - `array_index` is appended as `[<index>]` whenever present, including 0
/// - an empty `ancestor` yields the bare reference
pub fn generate_field_path(
    ancestor: &str,
    item_ref: &str,
    instance_id: Option<u32>,
    array_index: Option<usize>,
) -> String {
    let mut out = join(ancestor, item_ref);
    push_instance(&mut out, instance_id);
    if let Some(idx) = array_index {
        out.push('[');
        out.push_str(&idx.to_string());
        out.push(']');
    }
    out
}

/// Build the path of a section occurrence. Fields of the section nest under it.
pub fn generate_section_path(
    ancestor: &str,
    section_id: &str,
    section_instance_id: Option<u32>,
) -> String {
    let mut out = join(ancestor, section_id);
    push_instance(&mut out, section_instance_id);
    out
}

fn join(ancestor: &str, segment: &str) -> String {
    if ancestor.is_empty() {
        segment.to_string()
    } else {
        let mut out = String::with_capacity(ancestor.len() + 1 + segment.len());
        out.push_str(ancestor);
        out.push('.');
        out.push_str(segment);
        out
    }
}

fn push_instance(out: &mut String, instance_id: Option<u32>) {
    if let Some(id) = instance_id.filter(|id| *id > 1) {
        out.push('_');
        out.push_str(&id.to_string());
    }
}

/// Structured form of a field location, for callers that carry the parts around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldLocation {
    pub ancestor: String,
    pub item_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_index: Option<usize>,
}

impl FieldLocation {
    pub fn new(ancestor: impl Into<String>, item_ref: impl Into<String>) -> Self {
        Self {
            ancestor: ancestor.into(),
            item_ref: item_ref.into(),
            instance_id: None,
            array_index: None,
        }
    }

    pub fn with_instance(mut self, instance_id: u32) -> Self {
        self.instance_id = Some(instance_id);
        self
    }

    pub fn with_index(mut self, array_index: usize) -> Self {
        self.array_index = Some(array_index);
        self
    }

    pub fn to_path(&self) -> String {
        generate_field_path(
            &self.ancestor,
            &self.item_ref,
            self.instance_id,
            self.array_index,
        )
    }
}
