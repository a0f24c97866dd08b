use std::sync::Arc;

use nodeaddr_core::generate_section_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only `FormContent.version` this crate understands.
pub const FORM_CONTENT_VERSION: &str = "v2-items";

/// An ordered list of form items.
///
/// Items are reference-counted so that rewrites can hand back untouched
/// subtrees as the very same allocation (see [`crate::update`]).
pub type Items = Vec<Arc<FormItem>>;

/// A content document, discriminated by its `kind` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ContentDocument {
    FormContent(FormContent),
    MediaContent(MediaContent),
    GroupContent(GroupContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormContent {
    pub version: String,
    pub items: Items,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FormItem {
    FieldItem(FieldItem),
    SectionItem(SectionItem),
}

/// Bounds on how many occurrences a repeatable item may have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repeatable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// A leaf: one field, joined against the field registry by `ref`.
///
/// `item_instance_id` and `instances` are runtime state. The item itself is
/// its first occurrence; `instances` holds occurrences 2 and up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldItem {
    #[serde(rename = "ref")]
    pub item_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<Repeatable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_instance_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<FieldInstance>>,
}

impl FieldItem {
    pub fn new(item_ref: impl Into<String>) -> Self {
        Self {
            item_ref: item_ref.into(),
            ..Self::default()
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Occurrence id of the item itself.
    pub fn instance_id(&self) -> u32 {
        self.item_instance_id.unwrap_or(1)
    }

    pub fn occurrence_count(&self) -> usize {
        1 + self.instances.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInstance {
    pub item_instance_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A group of items. Exactly one of `children` or `collection` is set.
///
/// `section_instance_id` and `instances` are runtime state: the section's own
/// `children` are its first occurrence, `instances` hold occurrences 2 and up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionItem {
    #[serde(alias = "path")]
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Items>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsections: Option<Items>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<Repeatable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_instance_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<SectionInstance>>,
}

impl SectionItem {
    /// Path of the section's own occurrence under `ancestor`.
    pub fn path_under(&self, ancestor: &str) -> String {
        generate_section_path(ancestor, &self.id, self.section_instance_id)
    }

    pub fn instance_path(&self, ancestor: &str, inst: &SectionInstance) -> String {
        generate_section_path(ancestor, &self.id, Some(inst.section_instance_id))
    }

    /// Every nested item list: own children, subsections, then each instance.
    pub fn nested(&self) -> impl Iterator<Item = &[Arc<FormItem>]> + '_ {
        self.children
            .as_deref()
            .into_iter()
            .chain(self.subsections.as_deref())
            .chain(
                self.instances
                    .iter()
                    .flatten()
                    .map(|inst| inst.children.as_slice()),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInstance {
    pub section_instance_id: u32,
    pub children: Items,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionTag {
    #[default]
    CollectionNode,
}

/// A section or group whose members are library nodes rather than inline items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default)]
    pub kind: CollectionTag,
    /// Kind of the collected nodes, e.g. `FormContent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    pub const ALL: [&'static str; 4] = ["image", "video", "audio", "document"];
}

/// Generated media with its version history. Zero versions is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaContent {
    pub path: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub versions: Vec<MediaVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_version_idx: Option<usize>,
}

impl MediaContent {
    /// The selected version, or the latest one when nothing is selected.
    pub fn selected_version(&self) -> Option<&MediaVersion> {
        let last = self.versions.len().checked_sub(1)?;
        let idx = self.selected_version_idx.unwrap_or(last).min(last);
        self.versions.get(idx)
    }

    /// True when there is nothing to show yet and a renderer should offer to
    /// generate the first version.
    pub fn needs_generation(&self) -> bool {
        self.versions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaVersionTag {
    #[default]
    MediaVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaVersion {
    #[serde(default)]
    pub kind: MediaVersionTag,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A group of library nodes, referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupContent {
    pub path: String,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionConfig>,
}
