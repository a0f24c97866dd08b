#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the nodeaddr engine.

Do NOT depend on this crate directly.
Use `nodeaddr-io` instead.
"#]

pub mod canonical_json;
pub mod contract;
pub mod hashing;
pub mod instances;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod sanitize;
pub mod update;
pub mod validate;

pub use contract::{
    ContentKind, ContractCheck, ContractViolation, check_content, parse_content, parse_form_content,
    validate_content,
};
pub use hashing::{fingerprint_value, library_fingerprint, sha256_hex};
pub use instances::{InstanceError, add_field_instance, remove_field_instance};
pub use model::{
    CollectionConfig, ContentDocument, FORM_CONTENT_VERSION, FieldInstance, FieldItem, FormContent,
    FormItem, GroupContent, Items, MediaContent, MediaType, MediaVersion, Repeatable,
    SectionInstance, SectionItem,
};
pub use registry::{Datatype, FieldOption, FieldRegistry, FieldRegistryEntry, FieldRules};
pub use resolve::{
    FieldSlot, RefLookupError, collect_field_refs, collect_field_slots, find_field_value,
    find_field_value_strict, find_value_at_path, set_field_value, set_value_at_path,
};
pub use sanitize::sanitize_for_library;
pub use update::{Visit, rewrite_items, rewrite_or_share, walk_items};
pub use validate::{
    FieldIssue, FieldValidationOptions, FormValidationReport, IssueCode, validate_field,
    validate_form,
};
