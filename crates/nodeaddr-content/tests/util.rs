use std::path::Path;

use nodeaddr_content::{FieldRegistry, FieldRegistryEntry, Items, parse_form_content};
use serde_json::Value;

pub fn read_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!("failed to read fixture {} at {}: {e}", name, path.display())
    })
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_str(&read_fixture(name))
        .unwrap_or_else(|e| panic!("fixture {name} is not valid JSON: {e}"))
}

#[allow(dead_code)]
pub fn scene_items() -> Items {
    parse_form_content(&fixture_json("form.scene.json"))
        .expect("scene fixture passes the contract")
        .items
}

#[allow(dead_code)]
pub fn registry() -> FieldRegistry {
    let entries: Vec<FieldRegistryEntry> = serde_json::from_value(fixture_json("registry.json"))
        .expect("registry fixture");
    entries.into_iter().collect()
}
