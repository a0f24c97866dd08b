#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the nodeaddr engine.

Do NOT depend on this crate directly.
Use `nodeaddr-io` instead.
"#]

pub mod address;
pub mod field_path;
pub mod normalize;

pub use address::{
    AddressFormatError, AddressValidation, HybridAddress, ParsedAddress, validate_address,
};
pub use field_path::{FieldLocation, generate_field_path, generate_section_path};
pub use normalize::normalize_path;
