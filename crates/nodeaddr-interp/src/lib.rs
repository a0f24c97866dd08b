//! Template interpolation for JSON payloads.
//!
//! String leaves may embed `{{namespace.path.to.value}}` tokens. Interpolation
//! rewrites every string leaf against a context object and rebuilds containers,
//! leaving numbers, booleans and null untouched.
//!
//! Tokens that do not resolve are kept verbatim, so a broken template stays
//! visible downstream instead of silently turning into an empty string. Use
//! [`has_interpolation_tokens`] or [`unresolved_tokens`] to detect that case.

pub mod context;
pub mod template;

pub use context::{InterpolationContext, merge_job};
pub use template::{
    extract_tokens, get_nested_value, has_interpolation_tokens, interpolate_json,
    interpolate_string, unresolved_tokens,
};
