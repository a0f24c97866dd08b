//! JSON Schema gate for content documents, run before the contract check.

use anyhow::{Result, anyhow};
use jsonschema::Validator;
use nodeaddr_io::prelude::ContentKind;
use once_cell::sync::Lazy;
use serde_json::Value;

fn compile(name: &str, text: &str) -> Result<Validator, String> {
    let schema: Value = serde_json::from_str(text)
        .map_err(|e| format!("invalid {name} schema JSON: {e}"))?;
    Validator::new(&schema)
        .map_err(|e| format!("compile {name} schema: {e}"))
}

static FORM: Lazy<Result<Validator, String>> = Lazy::new(|| {
    compile(
        "form",
        include_str!("../../../schemas/form-content.v2.schema.json"),
    )
});

static MEDIA: Lazy<Result<Validator, String>> = Lazy::new(|| {
    compile(
        "media",
        include_str!("../../../schemas/media-content.schema.json"),
    )
});

static GROUP: Lazy<Result<Validator, String>> = Lazy::new(|| {
    compile(
        "group",
        include_str!("../../../schemas/group-content.schema.json"),
    )
});

/// Every schema error for `doc`; empty when it conforms.
pub fn schema_errors(kind: ContentKind, doc: &Value) -> Result<Vec<String>> {
    let compiled = match kind {
        ContentKind::Form => &FORM,
        ContentKind::Media => &MEDIA,
        ContentKind::Group => &GROUP,
    };
    let validator = compiled.as_ref().map_err(|e| anyhow!("{e}"))?;
    Ok(validator.iter_errors(doc).map(|e| e.to_string()).collect())
}
