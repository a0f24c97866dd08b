//! Shape contracts for content documents.
//!
//! Contracts run over raw JSON before anything is deserialized into the typed
//! model, so a failure can name the exact location (`items.2.children.0.ref`).
//! They never panic and never throw: callers get a [`ContractViolation`] value,
//! or a serializable [`ContractCheck`] (`{ "ok": false, "why": "..." }`).
//!
//! Refinements on top of plain structure:
//! - a section sets exactly one of `children` or `collection`
//! - `FormContent.version` must be a known version
//! - instance ids are unique and start at 2 (the item itself is occurrence 1)
//! - repeatable bounds are ordered and respected by runtime instances
//! - a media selection points at an existing version

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ContentDocument, FORM_CONTENT_VERSION, FormContent, MediaType};

const ROOT: &str = "(root)";

/// The first contract failure found, located by a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ContractViolation {
    pub path: String,
    pub message: String,
}

impl ContractViolation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// `"<dotted.path>: <message>"`.
    pub fn why(&self) -> String {
        self.to_string()
    }
}

/// Serializable validate-then-branch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
}

impl ContractCheck {
    pub fn ok() -> Self {
        Self {
            ok: true,
            why: None,
        }
    }
}

impl From<Result<(), ContractViolation>> for ContractCheck {
    fn from(res: Result<(), ContractViolation>) -> Self {
        match res {
            Ok(()) => Self::ok(),
            Err(v) => Self {
                ok: false,
                why: Some(v.why()),
            },
        }
    }
}

/// Which document contract to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Form,
    Media,
    Group,
}

impl ContentKind {
    /// Wire `kind` tag of documents of this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            ContentKind::Form => "FormContent",
            ContentKind::Media => "MediaContent",
            ContentKind::Group => "GroupContent",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ContentKind::Form => "form",
            ContentKind::Media => "media",
            ContentKind::Group => "group",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "form" | "FormContent" => Ok(ContentKind::Form),
            "media" | "MediaContent" => Ok(ContentKind::Media),
            "group" | "GroupContent" => Ok(ContentKind::Group),
            other => Err(format!(
                "unknown content kind '{other}' (expected form, media or group)"
            )),
        }
    }
}

/// Check `value` against the contract for `kind`.
pub fn check_content(kind: ContentKind, value: &Value) -> ContractCheck {
    validate_content(kind, value).into()
}

/// Check `value` against the contract for `kind`, returning the first violation.
pub fn validate_content(kind: ContentKind, value: &Value) -> Result<(), ContractViolation> {
    let obj = Obj::root(value)?;
    obj.tag(kind.tag())?;
    match kind {
        ContentKind::Form => check_form_content(&obj),
        ContentKind::Media => check_media_content(&obj),
        ContentKind::Group => check_group_content(&obj),
    }
}

/// Validate, then deserialize into the typed model.
pub fn parse_content(
    kind: ContentKind,
    value: &Value,
) -> Result<ContentDocument, ContractViolation> {
    validate_content(kind, value)?;
    serde_json::from_value(value.clone())
        .map_err(|e| ContractViolation::new(ROOT, e.to_string()))
}

pub fn parse_form_content(value: &Value) -> Result<FormContent, ContractViolation> {
    match parse_content(ContentKind::Form, value)? {
        ContentDocument::FormContent(form) => Ok(form),
        _ => Err(ContractViolation::new("kind", "expected 'FormContent'")),
    }
}

// -----------------------------------------------------------------------------
// Object cursor
// -----------------------------------------------------------------------------

struct Obj<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

fn sub(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

impl<'a> Obj<'a> {
    fn root(value: &'a Value) -> Result<Self, ContractViolation> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path: String::new(),
            }),
            _ => Err(ContractViolation::new(ROOT, "expected an object")),
        }
    }

    fn at(value: &'a Value, path: String) -> Result<Self, ContractViolation> {
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            _ => Err(ContractViolation::new(path, "expected an object")),
        }
    }

    fn key_path(&self, key: &str) -> String {
        sub(&self.path, key)
    }

    fn fail(&self, key: &str, message: impl Into<String>) -> ContractViolation {
        ContractViolation::new(self.key_path(key), message)
    }

    /// Present and not null.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn tag(&self, expected: &str) -> Result<(), ContractViolation> {
        let kind = self.required_str("kind")?;
        if kind != expected {
            return Err(self.fail(
                "kind",
                format!("expected '{expected}', got '{kind}'"),
            ));
        }
        Ok(())
    }

    fn required_str(&self, key: &str) -> Result<&'a str, ContractViolation> {
        match self.get(key) {
            None => Err(self.fail(key, "is required")),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(self.fail(key, "expected a string")),
        }
    }

    fn non_empty_str(&self, key: &str) -> Result<&'a str, ContractViolation> {
        let s = self.required_str(key)?;
        if s.trim().is_empty() {
            return Err(self.fail(key, "must not be empty"));
        }
        Ok(s)
    }

    fn optional_str(&self, key: &str) -> Result<Option<&'a str>, ContractViolation> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.fail(key, "expected a string")),
        }
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>, ContractViolation> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.fail(key, "expected a boolean")),
        }
    }

    fn optional_u32(&self, key: &str) -> Result<Option<u32>, ContractViolation> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| self.fail(key, "expected a non-negative integer")),
        }
    }

    fn required_u32(&self, key: &str) -> Result<u32, ContractViolation> {
        self.optional_u32(key)?
            .ok_or_else(|| self.fail(key, "is required"))
    }

    fn optional_array(&self, key: &str) -> Result<Option<&'a Vec<Value>>, ContractViolation> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(a)) => Ok(Some(a)),
            Some(_) => Err(self.fail(key, "expected an array")),
        }
    }

    fn required_array(&self, key: &str) -> Result<&'a Vec<Value>, ContractViolation> {
        self.optional_array(key)?
            .ok_or_else(|| self.fail(key, "is required"))
    }

    fn optional_object(&self, key: &str) -> Result<Option<Obj<'a>>, ContractViolation> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => Obj::at(v, self.key_path(key)).map(Some),
        }
    }
}

// -----------------------------------------------------------------------------
// Form content
// -----------------------------------------------------------------------------

fn check_form_content(obj: &Obj<'_>) -> Result<(), ContractViolation> {
    let version = obj.required_str("version")?;
    if version != FORM_CONTENT_VERSION {
        let reason = format!(
            "unsupported form content version '{version}' (expected {FORM_CONTENT_VERSION})"
        );
        return Err(obj.fail("version", reason));
    }

    let items = obj.required_array("items")?;
    check_item_list(items, &obj.key_path("items"))
}

fn check_item_list(items: &[Value], path: &str) -> Result<(), ContractViolation> {
    for (i, item) in items.iter().enumerate() {
        check_form_item(item, sub(path, &i.to_string()))?;
    }
    Ok(())
}

/// Returns the item's `kind` so callers can restrict where sections may appear.
fn check_form_item(value: &Value, path: String) -> Result<&'static str, ContractViolation> {
    let obj = Obj::at(value, path)?;
    match obj.required_str("kind")? {
        "FieldItem" => check_field_item(&obj).map(|()| "FieldItem"),
        "SectionItem" => check_section_item(&obj).map(|()| "SectionItem"),
        other => Err(obj.fail(
            "kind",
            format!("unknown form item kind '{other}'"),
        )),
    }
}

fn check_field_item(obj: &Obj<'_>) -> Result<(), ContractViolation> {
    obj.non_empty_str("ref")?;
    obj.optional_bool("required")?;
    obj.optional_bool("editable")?;
    obj.optional_str("importance")?;

    let repeatable = check_repeatable(obj)?;

    if obj.optional_u32("item_instance_id")? == Some(0) {
        return Err(obj.fail("item_instance_id", "instance ids start at 1"));
    }

    if let Some(instances) = obj.optional_array("instances")? {
        let path = obj.key_path("instances");
        let mut seen = BTreeSet::new();
        for (i, inst) in instances.iter().enumerate() {
            let inst = Obj::at(inst, sub(&path, &i.to_string()))?;
            let id = inst.required_u32("item_instance_id")?;
            check_instance_id(&inst, "item_instance_id", id, &mut seen)?;
        }
        check_occurrences(obj, repeatable, instances.len())?;
    }

    Ok(())
}

fn check_section_item(obj: &Obj<'_>) -> Result<(), ContractViolation> {
    match (obj.get("id"), obj.get("path")) {
        (Some(_), Some(_)) => return Err(obj.fail("path", "use either id or path, not both")),
        (Some(_), None) => {
            obj.non_empty_str("id")?;
        }
        (None, Some(_)) => {
            obj.non_empty_str("path")?;
        }
        (None, None) => return Err(obj.fail("id", "is required")),
    }
    obj.required_str("label")?;

    let children = obj.optional_array("children")?;
    let collection = obj.optional_object("collection")?;
    match (children, &collection) {
        (Some(_), Some(_)) | (None, None) => {
            let at = if obj.path.is_empty() { ROOT } else { obj.path.as_str() };
            return Err(ContractViolation::new(
                at,
                "exactly one of children or collection must be set",
            ));
        }
        _ => {}
    }

    if let Some(children) = children {
        check_item_list(children, &obj.key_path("children"))?;
    }
    if let Some(collection) = collection {
        check_collection(&collection)?;
    }

    if let Some(subsections) = obj.optional_array("subsections")? {
        let path = obj.key_path("subsections");
        for (i, s) in subsections.iter().enumerate() {
            let at = sub(&path, &i.to_string());
            if check_form_item(s, at.clone())? != "SectionItem" {
                return Err(ContractViolation::new(
                    sub(&at, "kind"),
                    "subsections may only contain SectionItem",
                ));
            }
        }
    }

    let repeatable = check_repeatable(obj)?;
    obj.optional_bool("collapsed")?;
    obj.optional_bool("hidden")?;

    if obj.optional_u32("section_instance_id")? == Some(0) {
        return Err(obj.fail("section_instance_id", "instance ids start at 1"));
    }

    if let Some(instances) = obj.optional_array("instances")? {
        let path = obj.key_path("instances");
        let mut seen = BTreeSet::new();
        for (i, inst) in instances.iter().enumerate() {
            let inst = Obj::at(inst, sub(&path, &i.to_string()))?;
            let id = inst.required_u32("section_instance_id")?;
            check_instance_id(&inst, "section_instance_id", id, &mut seen)?;
            let children = inst.required_array("children")?;
            check_item_list(children, &inst.key_path("children"))?;
        }
        check_occurrences(obj, repeatable, instances.len())?;
    }

    Ok(())
}

fn check_repeatable(
    obj: &Obj<'_>,
) -> Result<Option<(Option<u32>, Option<u32>)>, ContractViolation> {
    let Some(rep) = obj.optional_object("repeatable")? else {
        return Ok(None);
    };
    let min = rep.optional_u32("min")?;
    let max = rep.optional_u32("max")?;
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(rep.fail("min", format!("min ({lo}) exceeds max ({hi})")));
        }
    }
    if max == Some(0) {
        return Err(rep.fail("max", "must be at least 1"));
    }
    Ok(Some((min, max)))
}

fn check_instance_id(
    inst: &Obj<'_>,
    key: &str,
    id: u32,
    seen: &mut BTreeSet<u32>,
) -> Result<(), ContractViolation> {
    if id < 2 {
        return Err(inst.fail(
            key,
            "instance ids start at 2 (the item itself is instance 1)",
        ));
    }
    if !seen.insert(id) {
        return Err(inst.fail(key, format!("duplicate instance id {id}")));
    }
    Ok(())
}

fn check_occurrences(
    obj: &Obj<'_>,
    repeatable: Option<(Option<u32>, Option<u32>)>,
    extra: usize,
) -> Result<(), ContractViolation> {
    let Some((_, max)) = repeatable else {
        return Err(obj.fail(
            "instances",
            "only repeatable items carry instances",
        ));
    };
    let total = extra + 1;
    if let Some(max) = max {
        if total > max as usize {
            return Err(obj.fail(
                "instances",
                format!("{total} occurrences exceed repeatable max {max}"),
            ));
        }
    }
    Ok(())
}

fn check_collection(obj: &Obj<'_>) -> Result<(), ContractViolation> {
    if let Some(kind) = obj.optional_str("kind")? {
        if kind != "CollectionNode" {
            return Err(obj.fail(
                "kind",
                format!("expected 'CollectionNode', got '{kind}'"),
            ));
        }
    }
    obj.optional_str("node_kind")?;
    if let Some(ids) = obj.optional_array("node_ids")? {
        check_string_list(ids, &obj.key_path("node_ids"))?;
    }
    let min = obj.optional_u32("min")?;
    let max = obj.optional_u32("max")?;
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(obj.fail("min", format!("min ({lo}) exceeds max ({hi})")));
        }
    }
    Ok(())
}

fn check_string_list(values: &[Value], path: &str) -> Result<(), ContractViolation> {
    for (i, v) in values.iter().enumerate() {
        match v.as_str() {
            Some(s) if !s.trim().is_empty() => {}
            Some(_) => {
                return Err(ContractViolation::new(
                    sub(path, &i.to_string()),
                    "must not be empty",
                ));
            }
            None => {
                return Err(ContractViolation::new(
                    sub(path, &i.to_string()),
                    "expected a string",
                ));
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Media and group content
// -----------------------------------------------------------------------------

fn check_media_content(obj: &Obj<'_>) -> Result<(), ContractViolation> {
    obj.non_empty_str("path")?;

    let media_type = obj.required_str("type")?;
    if !MediaType::ALL.contains(&media_type) {
        let known = MediaType::ALL.join(", ");
        let reason = format!("unknown media type '{media_type}' (one of {known})");
        return Err(obj.fail("type", reason));
    }

    let versions = obj.required_array("versions")?;
    let path = obj.key_path("versions");
    for (i, v) in versions.iter().enumerate() {
        let version = Obj::at(v, sub(&path, &i.to_string()))?;
        if let Some(kind) = version.optional_str("kind")? {
            if kind != "MediaVersion" {
                return Err(version.fail(
                    "kind",
                    format!("expected 'MediaVersion', got '{kind}'"),
                ));
            }
        }
        version.non_empty_str("url")?;
        version.optional_str("prompt")?;
        version.optional_str("created_at")?;
    }

    let selected = obj
        .get("selected_version_idx")
        .map(|v| {
            v.as_u64().ok_or_else(|| {
                obj.fail("selected_version_idx", "expected a non-negative integer")
            })
        })
        .transpose()?;
    if let Some(idx) = selected {
        if versions.is_empty() {
            return Err(obj.fail("selected_version_idx", "no versions to select"));
        }
        if idx >= versions.len() as u64 {
            return Err(obj.fail(
                "selected_version_idx",
                format!("index {idx} out of range for {} version(s)", versions.len()),
            ));
        }
    }

    Ok(())
}

fn check_group_content(obj: &Obj<'_>) -> Result<(), ContractViolation> {
    obj.non_empty_str("path")?;
    let children = obj.required_array("children")?;
    check_string_list(children, &obj.key_path("children"))?;
    if let Some(collection) = obj.optional_object("collection")? {
        check_collection(&collection)?;
    }
    Ok(())
}
