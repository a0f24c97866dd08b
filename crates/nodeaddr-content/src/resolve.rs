//! Locate and rewrite field values inside a form tree.
//!
//! Two ways to name a field:
//! - by bare `ref`: [`find_field_value`], [`set_field_value`]. A tree may carry
//!   the same ref in several sections or section instances; lookup by ref
//!   returns the first match, [`find_field_value_strict`] reports the ambiguity.
//! - by field path: [`find_value_at_path`], [`set_value_at_path`]. Paths are
//!   built with [`generate_field_path`] while walking, so a path produced for a
//!   location always addresses that same slot.

use std::ops::ControlFlow;
use std::sync::Arc;

use nodeaddr_core::generate_field_path;
use serde_json::Value;

use crate::model::{FieldInstance, FieldItem, FormItem, Items};
use crate::update::{Visit, rewrite_or_share, walk_items};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefLookupError {
    #[error("field ref '{item_ref}' matches {} locations: {}", paths.len(), paths.join(", "))]
    Ambiguous {
        item_ref: String,
        paths: Vec<String>,
    },

    #[error("no field at path '{path}'")]
    NoSuchPath { path: String },

    #[error("index {index} out of range at '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("value at '{path}' is not an array")]
    NotAnArray { path: String },
}

/// One field occurrence, located by its constructed path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot<'a> {
    pub path: String,
    pub item_ref: &'a str,
    pub instance_id: u32,
    pub required: bool,
    pub value: Option<&'a Value>,
}

/// Value of the first field with `item_ref`.
///
/// Each level checks its own fields before descending into sections (own
/// children, subsections, then each instance). The search stops at the first
/// field with a matching ref, even when that field has no value yet.
pub fn find_field_value<'a>(items: &'a [Arc<FormItem>], item_ref: &str) -> Option<&'a Value> {
    find_field(items, item_ref).and_then(|f| f.value.as_ref())
}

fn find_field<'a>(items: &'a [Arc<FormItem>], item_ref: &str) -> Option<&'a FieldItem> {
    let direct = items.iter().find_map(|item| match item.as_ref() {
        FormItem::FieldItem(f) if f.item_ref == item_ref => Some(f),
        _ => None,
    });
    if direct.is_some() {
        return direct;
    }

    items.iter().find_map(|item| match item.as_ref() {
        FormItem::SectionItem(section) => section
            .nested()
            .find_map(|list| find_field(list, item_ref)),
        FormItem::FieldItem(_) => None,
    })
}

/// Like [`find_field_value`], but fails when the ref occurs more than once.
pub fn find_field_value_strict<'a>(
    items: &'a [Arc<FormItem>],
    item_ref: &str,
) -> Result<Option<&'a Value>, RefLookupError> {
    let mut hits: Vec<(String, &'a FieldItem)> = Vec::new();
    let _ = walk_items(items, "", &mut |ancestor, item| {
        if let FormItem::FieldItem(f) = item {
            if f.item_ref == item_ref {
                hits.push((own_path(ancestor, f), f));
            }
        }
        ControlFlow::<()>::Continue(())
    });

    match hits.len() {
        0 => Ok(None),
        1 => Ok(hits[0].1.value.as_ref()),
        _ => Err(RefLookupError::Ambiguous {
            item_ref: item_ref.to_string(),
            paths: hits.into_iter().map(|(p, _)| p).collect(),
        }),
    }
}

/// Set the value of every field with `item_ref`.
///
/// Only branches containing a match are rebuilt; everything else is shared
/// with the input.
pub fn set_field_value(items: &[Arc<FormItem>], item_ref: &str, new_value: Value) -> Items {
    rewrite_or_share(items, "", &mut |_, item| match item {
        FormItem::FieldItem(f) if f.item_ref == item_ref => {
            let mut next = f.clone();
            next.value = Some(new_value.clone());
            Visit::Replace(FormItem::FieldItem(next))
        }
        FormItem::FieldItem(_) => Visit::Keep,
        FormItem::SectionItem(_) => Visit::Descend,
    })
}

/// Every field ref in the tree, in document order, once per occurrence of the
/// enclosing section (so refs inside section instances repeat).
pub fn collect_field_refs(items: &[Arc<FormItem>]) -> Vec<String> {
    let mut out = Vec::new();
    let _ = walk_items(items, "", &mut |_, item| {
        if let FormItem::FieldItem(f) = item {
            out.push(f.item_ref.clone());
        }
        ControlFlow::<()>::Continue(())
    });
    out
}

/// Every field occurrence with its path under `root`.
pub fn collect_field_slots<'a>(items: &'a [Arc<FormItem>], root: &str) -> Vec<FieldSlot<'a>> {
    let mut out = Vec::new();
    let _ = walk_items(items, root, &mut |ancestor, item| {
        if let FormItem::FieldItem(f) = item {
            out.push(FieldSlot {
                path: own_path(ancestor, f),
                item_ref: &f.item_ref,
                instance_id: f.instance_id(),
                required: f.is_required(),
                value: f.value.as_ref(),
            });
            for inst in f.instances.iter().flatten() {
                out.push(FieldSlot {
                    path: instance_path(ancestor, f, inst),
                    item_ref: &f.item_ref,
                    instance_id: inst.item_instance_id,
                    required: f.is_required(),
                    value: inst.value.as_ref(),
                });
            }
        }
        ControlFlow::<()>::Continue(())
    });
    out
}

/// Value stored at a field path. A trailing `[n]` indexes into an array value.
pub fn find_value_at_path<'a>(
    items: &'a [Arc<FormItem>],
    root: &str,
    path: &str,
) -> Option<&'a Value> {
    let (base, index) = split_index(path);

    let found = walk_items(items, root, &mut |ancestor, item| {
        let FormItem::FieldItem(f) = item else {
            return ControlFlow::Continue(());
        };
        if own_path(ancestor, f) == base {
            return ControlFlow::Break(f.value.as_ref());
        }
        for inst in f.instances.iter().flatten() {
            if instance_path(ancestor, f, inst) == base {
                return ControlFlow::Break(inst.value.as_ref());
            }
        }
        ControlFlow::Continue(())
    });

    let value = match found {
        ControlFlow::Break(v) => v?,
        ControlFlow::Continue(()) => return None,
    };
    match index {
        Some(idx) => value.as_array()?.get(idx),
        None => Some(value),
    }
}

/// Set the value at a field path. A trailing `[n]` sets one array element
/// (`n == len` appends).
pub fn set_value_at_path(
    items: &[Arc<FormItem>],
    root: &str,
    path: &str,
    new_value: Value,
) -> Result<Items, RefLookupError> {
    let (base, index) = split_index(path);
    let mut matched = false;
    let mut failure: Option<RefLookupError> = None;

    let out = rewrite_or_share(items, root, &mut |ancestor, item| {
        let FormItem::FieldItem(f) = item else {
            return Visit::Descend;
        };
        if matched || failure.is_some() {
            return Visit::Keep;
        }

        if own_path(ancestor, f) == base {
            matched = true;
            return match place(f.value.as_ref(), index, &new_value, path) {
                Ok(v) => {
                    let mut next = f.clone();
                    next.value = Some(v);
                    Visit::Replace(FormItem::FieldItem(next))
                }
                Err(e) => {
                    failure = Some(e);
                    Visit::Keep
                }
            };
        }

        let Some(instances) = f.instances.as_ref() else {
            return Visit::Keep;
        };
        let Some(pos) = instances
            .iter()
            .position(|inst| instance_path(ancestor, f, inst) == base)
        else {
            return Visit::Keep;
        };

        matched = true;
        match place(instances[pos].value.as_ref(), index, &new_value, path) {
            Ok(v) => {
                let mut next = f.clone();
                if let Some(list) = next.instances.as_mut() {
                    list[pos] = FieldInstance {
                        item_instance_id: instances[pos].item_instance_id,
                        value: Some(v),
                    };
                }
                Visit::Replace(FormItem::FieldItem(next))
            }
            Err(e) => {
                failure = Some(e);
                Visit::Keep
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }
    if !matched {
        return Err(RefLookupError::NoSuchPath {
            path: path.to_string(),
        });
    }
    Ok(out)
}

fn own_path(ancestor: &str, f: &FieldItem) -> String {
    generate_field_path(ancestor, &f.item_ref, Some(f.instance_id()), None)
}

fn instance_path(ancestor: &str, f: &FieldItem, inst: &FieldInstance) -> String {
    generate_field_path(ancestor, &f.item_ref, Some(inst.item_instance_id), None)
}

/// Split `a.b[3]` into (`a.b`, Some(3)).
fn split_index(path: &str) -> (&str, Option<usize>) {
    let Some(stripped) = path.strip_suffix(']') else {
        return (path, None);
    };
    match stripped.rsplit_once('[') {
        Some((base, idx)) => match idx.parse::<usize>() {
            Ok(n) => (base, Some(n)),
            Err(_) => (path, None),
        },
        None => (path, None),
    }
}

fn place(
    current: Option<&Value>,
    index: Option<usize>,
    new_value: &Value,
    path: &str,
) -> Result<Value, RefLookupError> {
    let Some(idx) = index else {
        return Ok(new_value.clone());
    };

    let mut list = match current {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list.clone(),
        Some(_) => {
            return Err(RefLookupError::NotAnArray {
                path: path.to_string(),
            });
        }
    };

    match idx.cmp(&list.len()) {
        std::cmp::Ordering::Less => list[idx] = new_value.clone(),
        std::cmp::Ordering::Equal => list.push(new_value.clone()),
        std::cmp::Ordering::Greater => {
            return Err(RefLookupError::IndexOutOfRange {
                path: path.to_string(),
                index: idx,
                len: list.len(),
            });
        }
    }
    Ok(Value::Array(list))
}
