//! Paths built from a location and the resolver's walk must name the same slot.

use std::collections::BTreeMap;

use nodeaddr_content::{Items, collect_field_slots, find_value_at_path, parse_form_content};
use nodeaddr_core::{generate_field_path, generate_section_path};
use serde_json::{Value, json};

const SECTIONS: u32 = 3;
const SECTION_OCCURRENCES: u32 = 2;
const FIELD_OCCURRENCES: u32 = 3;

fn label(section: u32, section_instance: u32, field_instance: u32) -> String {
    format!("s{section}.{section_instance}.f{field_instance}")
}

fn field(section: u32, section_instance: u32) -> Value {
    let instances: Vec<Value> = (2..=FIELD_OCCURRENCES)
        .map(|fi| {
            let value = label(section, section_instance, fi);
            json!({ "item_instance_id": fi, "value": value })
        })
        .collect();
    json!({
        "kind": "FieldItem",
        "ref": "note",
        "repeatable": { "max": FIELD_OCCURRENCES },
        "value": label(section, section_instance, 1),
        "instances": instances
    })
}

/// `SECTIONS` repeatable sections, each nested in the previous one.
fn nested_section(section: u32) -> Value {
    let children = |si: u32| {
        let mut list = vec![field(section, si)];
        if section < SECTIONS && si == 1 {
            list.push(nested_section(section + 1));
        }
        Value::Array(list)
    };
    let instances: Vec<Value> = (2..=SECTION_OCCURRENCES)
        .map(|si| json!({ "section_instance_id": si, "children": children(si) }))
        .collect();
    json!({
        "kind": "SectionItem",
        "id": format!("sec{section}"),
        "label": format!("Section {section}"),
        "repeatable": { "max": SECTION_OCCURRENCES },
        "children": children(1),
        "instances": instances
    })
}

fn document() -> Items {
    let doc = json!({ "kind": "FormContent", "version": "v2-items", "items": [nested_section(1)] });
    parse_form_content(&doc)
        .expect("generated document passes the contract")
        .items
}

#[test]
fn builder_paths_match_resolver_walk() {
    let items = document();
    let root = "root.0";

    let form_values: BTreeMap<String, Value> = collect_field_slots(&items, root)
        .into_iter()
        .filter_map(|slot| Some((slot.path, slot.value?.clone())))
        .collect();

    // sec1 occurrence 1 holds sec2, whose occurrence 1 holds sec3.
    let mut ancestor = root.to_string();
    let mut checked = 0;
    for section in 1..=SECTIONS {
        for si in 1..=SECTION_OCCURRENCES {
            let section_path = generate_section_path(&ancestor, &format!("sec{section}"), Some(si));
            for fi in 1..=FIELD_OCCURRENCES {
                let path = generate_field_path(&section_path, "note", Some(fi), None);
                let expected = json!(label(section, si, fi));

                let resolved = find_value_at_path(&items, root, &path);
                assert_eq!(form_values.get(&path), Some(&expected), "form at {path}");
                assert_eq!(resolved, Some(&expected), "resolver at {path}");
                checked += 1;
            }
        }
        ancestor = generate_section_path(&ancestor, &format!("sec{section}"), None);
    }

    let total = SECTIONS * SECTION_OCCURRENCES * FIELD_OCCURRENCES;
    assert_eq!(checked, total as usize);
    assert_eq!(form_values.len(), checked);
}

#[test]
fn every_path_is_unique() {
    let items = document();
    let slots = collect_field_slots(&items, "root.0");
    let mut paths: Vec<&str> = slots.iter().map(|s| s.path.as_str()).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
}
