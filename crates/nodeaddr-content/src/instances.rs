//! Adding and removing occurrences of repeatable fields.
//!
//! A field is addressed by the path of its own (first) occurrence. New
//! occurrences get the next free instance id and start without a value.

use std::sync::Arc;

use nodeaddr_core::generate_field_path;

use crate::model::{FieldInstance, FieldItem, FormItem, Items};
use crate::update::{Visit, rewrite_or_share};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("no field at path '{path}'")]
    NoSuchField { path: String },

    #[error("field at '{path}' is not repeatable")]
    NotRepeatable { path: String },

    #[error("field at '{path}' already has the maximum of {max} occurrence(s)")]
    MaxReached { path: String, max: u32 },

    #[error("field at '{path}' must keep at least {min} occurrence(s)")]
    MinReached { path: String, min: u32 },

    #[error("the first occurrence of '{path}' cannot be removed")]
    BaseInstance { path: String },

    #[error("field at '{path}' has no instance {instance_id}")]
    UnknownInstance { path: String, instance_id: u32 },
}

/// Append a new occurrence. Returns the rewritten tree and the new instance id.
pub fn add_field_instance(
    items: &[Arc<FormItem>],
    root: &str,
    field_path: &str,
) -> Result<(Items, u32), InstanceError> {
    let mut outcome: Option<Result<u32, InstanceError>> = None;

    let out = rewrite_or_share(items, root, &mut |ancestor, item| {
        let Some(f) = target(ancestor, item, field_path, outcome.is_some()) else {
            return descend_sections(item);
        };

        let Some(repeatable) = f.repeatable else {
            outcome = Some(Err(InstanceError::NotRepeatable {
                path: field_path.to_string(),
            }));
            return Visit::Keep;
        };
        if let Some(max) = repeatable.max {
            if f.occurrence_count() >= max as usize {
                outcome = Some(Err(InstanceError::MaxReached {
                    path: field_path.to_string(),
                    max,
                }));
                return Visit::Keep;
            }
        }

        let next_id = f
            .instances
            .iter()
            .flatten()
            .map(|inst| inst.item_instance_id)
            .chain(std::iter::once(f.instance_id()))
            .max()
            .unwrap_or(1)
            + 1;

        let mut next = f.clone();
        next.instances.get_or_insert_with(Vec::new).push(FieldInstance {
            item_instance_id: next_id,
            value: None,
        });
        outcome = Some(Ok(next_id));
        Visit::Replace(FormItem::FieldItem(next))
    });

    match outcome {
        Some(Ok(id)) => Ok((out, id)),
        Some(Err(e)) => Err(e),
        None => Err(InstanceError::NoSuchField {
            path: field_path.to_string(),
        }),
    }
}

/// Remove occurrence `instance_id`, keeping at least `repeatable.min` (default 1).
pub fn remove_field_instance(
    items: &[Arc<FormItem>],
    root: &str,
    field_path: &str,
    instance_id: u32,
) -> Result<Items, InstanceError> {
    let mut outcome: Option<Result<(), InstanceError>> = None;

    let out = rewrite_or_share(items, root, &mut |ancestor, item| {
        let Some(f) = target(ancestor, item, field_path, outcome.is_some()) else {
            return descend_sections(item);
        };

        let fail = |e: InstanceError| -> (Option<Result<(), InstanceError>>, Visit) {
            (Some(Err(e)), Visit::Keep)
        };
        let (result, visit) = if instance_id == f.instance_id() {
            fail(InstanceError::BaseInstance {
                path: field_path.to_string(),
            })
        } else {
            let position = f
                .instances
                .iter()
                .flatten()
                .position(|inst| inst.item_instance_id == instance_id);
            let min = f.repeatable.and_then(|r| r.min).unwrap_or(1);

            match position {
                None => fail(InstanceError::UnknownInstance {
                    path: field_path.to_string(),
                    instance_id,
                }),
                Some(_) if f.occurrence_count() <= min as usize => {
                    fail(InstanceError::MinReached {
                        path: field_path.to_string(),
                        min,
                    })
                }
                Some(pos) => {
                    let mut next = f.clone();
                    if let Some(list) = next.instances.as_mut() {
                        list.remove(pos);
                        if list.is_empty() {
                            next.instances = None;
                        }
                    }
                    (Some(Ok(())), Visit::Replace(FormItem::FieldItem(next)))
                }
            }
        };
        outcome = result;
        visit
    });

    match outcome {
        Some(Ok(())) => Ok(out),
        Some(Err(e)) => Err(e),
        None => Err(InstanceError::NoSuchField {
            path: field_path.to_string(),
        }),
    }
}

fn target<'a>(
    ancestor: &str,
    item: &'a FormItem,
    field_path: &str,
    done: bool,
) -> Option<&'a FieldItem> {
    match item {
        FormItem::FieldItem(f)
            if !done
                && generate_field_path(ancestor, &f.item_ref, Some(f.instance_id()), None)
                    == field_path =>
        {
            Some(f)
        }
        _ => None,
    }
}

fn descend_sections(item: &FormItem) -> Visit {
    match item {
        FormItem::SectionItem(_) => Visit::Descend,
        FormItem::FieldItem(_) => Visit::Keep,
    }
}
