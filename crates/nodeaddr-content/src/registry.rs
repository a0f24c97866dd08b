//! Field registry: display metadata, rules and options per field id.
//!
//! Entries are owned elsewhere and consumed read-only; form items join against
//! them through `FieldItem.ref`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    #[serde(alias = "string")]
    Text,
    Number,
    Integer,
    Boolean,
    Array,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Validation rules. Which ones apply depends on the datatype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRegistryEntry {
    pub id: String,
    pub field_id: String,
    pub datatype: Datatype,
    #[serde(default)]
    pub widget: String,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub rules: FieldRules,
    #[serde(default)]
    pub ui: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl FieldRegistryEntry {
    /// Widgets whose value must come from `options`.
    pub fn is_choice_widget(&self) -> bool {
        matches!(self.widget.as_str(), "select" | "radio" | "tags")
    }
}

/// Lookup table keyed by `field_id`, with `id` accepted as a fallback key.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    entries: BTreeMap<String, FieldRegistryEntry>,
    aliases: BTreeMap<String, String>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: FieldRegistryEntry) {
        self.aliases.insert(entry.id.clone(), entry.field_id.clone());
        self.entries.insert(entry.field_id.clone(), entry);
    }

    pub fn get(&self, item_ref: &str) -> Option<&FieldRegistryEntry> {
        self.entries.get(item_ref).or_else(|| {
            self.aliases
                .get(item_ref)
                .and_then(|field_id| self.entries.get(field_id))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<FieldRegistryEntry> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = FieldRegistryEntry>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.insert(entry);
        }
        registry
    }
}
