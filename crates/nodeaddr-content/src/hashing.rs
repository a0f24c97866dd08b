//! Content fingerprints.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::canonical_string;
use crate::contract::{ContentKind, ContractViolation};
use crate::sanitize::sanitize_for_library;

/// Lowercase hex SHA-256.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// `sha256:<hex>` of the canonical JSON of `value`.
pub fn fingerprint_value(value: &Value) -> String {
    format!("sha256:{}", sha256_hex(canonical_string(value).as_bytes()))
}

/// Fingerprint of a document as it would be stored in a library.
///
/// Runtime instances are stripped first: adding or removing occurrences does
/// not change the fingerprint.
pub fn library_fingerprint(kind: ContentKind, doc: &Value) -> Result<String, ContractViolation> {
    let clean = sanitize_for_library(kind, doc)?;
    Ok(fingerprint_value(&clean))
}
