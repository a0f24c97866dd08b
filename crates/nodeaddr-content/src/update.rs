//! Tree traversal and the "rebuild the path, share the rest" rewrite.
//!
//! Every mutation of a form tree goes through [`rewrite_items`]. Items that are
//! not touched come back as the same `Arc` (pointer-equal), so a caller can
//! detect change with `Arc::ptr_eq` instead of a deep comparison.
//!
//! Both traversals hand the visitor the ancestor path each item lives under,
//! built with the same rules as [`nodeaddr_core::generate_field_path`]:
//! a section's own children and subsections nest under the section path, and
//! each section instance nests under the instance-suffixed section path.

use std::ops::ControlFlow;
use std::sync::Arc;

use crate::model::{FormItem, Items, SectionInstance, SectionItem};

/// What a rewrite visitor wants done with one item.
#[derive(Debug)]
pub enum Visit {
    /// Leave the item as is, do not look inside.
    Keep,
    /// Look inside the item's nested lists. Same as `Keep` for fields.
    Descend,
    /// Swap the item for a new one.
    Replace(FormItem),
}

/// Rewrite `items`, returning `None` when nothing changed.
pub fn rewrite_items<F>(items: &[Arc<FormItem>], ancestor: &str, visit: &mut F) -> Option<Items>
where
    F: FnMut(&str, &FormItem) -> Visit,
{
    let mut out: Option<Items> = None;

    for (i, item) in items.iter().enumerate() {
        let next = match visit(ancestor, item.as_ref()) {
            Visit::Keep => None,
            Visit::Replace(replacement) => Some(Arc::new(replacement)),
            Visit::Descend => match item.as_ref() {
                FormItem::FieldItem(_) => None,
                FormItem::SectionItem(section) => rewrite_section(section, ancestor, visit)
                    .map(|s| Arc::new(FormItem::SectionItem(s))),
            },
        };

        if let Some(next) = next {
            out.get_or_insert_with(|| items[..i].to_vec()).push(next);
        } else if let Some(buf) = out.as_mut() {
            buf.push(Arc::clone(item));
        }
    }

    out
}

/// Like [`rewrite_items`] but always returns a list.
pub fn rewrite_or_share<F>(items: &[Arc<FormItem>], ancestor: &str, visit: &mut F) -> Items
where
    F: FnMut(&str, &FormItem) -> Visit,
{
    rewrite_items(items, ancestor, visit)
        .unwrap_or_else(|| items.to_vec())
}

fn rewrite_section<F>(
    section: &SectionItem,
    ancestor: &str,
    visit: &mut F,
) -> Option<SectionItem>
where
    F: FnMut(&str, &FormItem) -> Visit,
{
    let own = section.path_under(ancestor);

    let children = section
        .children
        .as_deref()
        .and_then(|c| rewrite_items(c, &own, visit));
    let subsections = section
        .subsections
        .as_deref()
        .and_then(|c| rewrite_items(c, &own, visit));

    let mut instances: Option<Vec<SectionInstance>> = None;
    if let Some(list) = section.instances.as_deref() {
        for (i, inst) in list.iter().enumerate() {
            let path = section.instance_path(ancestor, inst);
            if let Some(children) = rewrite_items(&inst.children, &path, visit) {
                let next = SectionInstance {
                    section_instance_id: inst.section_instance_id,
                    children,
                };
                instances
                    .get_or_insert_with(|| list[..i].to_vec())
                    .push(next);
            } else if let Some(buf) = instances.as_mut() {
                buf.push(inst.clone());
            }
        }
    }

    if children.is_none() && subsections.is_none() && instances.is_none() {
        return None;
    }

    let mut next = section.clone();
    if children.is_some() {
        next.children = children;
    }
    if subsections.is_some() {
        next.subsections = subsections;
    }
    if instances.is_some() {
        next.instances = instances;
    }
    Some(next)
}

/// Depth-first, document-order walk. Stops at the first `Break`.
pub fn walk_items<'a, B, F>(
    items: &'a [Arc<FormItem>],
    ancestor: &str,
    f: &mut F,
) -> ControlFlow<B>
where
    F: FnMut(&str, &'a FormItem) -> ControlFlow<B>,
{
    for item in items {
        f(ancestor, item.as_ref())?;

        if let FormItem::SectionItem(section) = item.as_ref() {
            let own = section.path_under(ancestor);
            if let Some(children) = section.children.as_deref() {
                walk_items(children, &own, f)?;
            }
            if let Some(subsections) = section.subsections.as_deref() {
                walk_items(subsections, &own, f)?;
            }
            for inst in section.instances.iter().flatten() {
                let path = section.instance_path(ancestor, inst);
                walk_items(&inst.children, &path, f)?;
            }
        }
    }
    ControlFlow::Continue(())
}
