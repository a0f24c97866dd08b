//! Hybrid address grammar.
//!
//! A hybrid address names a node in the content hierarchy (the ltree part) and,
//! optionally, a location inside that node's JSON content (the json part):
//!
//! ```text
//! root.user_input#characters.lead.character_name.value
//! \_____________/ \__________________________________/
//!   ltree path              json keys
//! ```
//!
//! Rules:
//! - the whole address only uses `[a-zA-Z0-9_.#]` and at most one `#`
//! - every ltree segment matches `[a-zA-Z_][a-zA-Z0-9_]*`
//! - every json key matches `[a-zA-Z_][a-zA-Z0-9_]*`
//!
//! Everything here is pure and deterministic.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.]+(#[a-zA-Z0-9_.]+)?$")
        .expect("address pattern compiles")
});

static LTREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
        .expect("ltree pattern compiles")
});

static JSON_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$")
        .expect("json key pattern compiles")
});

/// Local grammar failure. The message always names the offending part.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressFormatError {
    #[error("address must be a non-empty string")]
    Empty,

    /// Illegal characters, more than one `#`, or an empty part around `#`.
    #[error("invalid address format: '{address}'")]
    InvalidFormat { address: String },

    #[error("invalid ltree path: '{path}'")]
    InvalidLtreePath { path: String },

    #[error("invalid json key: '{key}'")]
    InvalidJsonKey { key: String },
}

/// The two halves of a valid address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub ltree_path: String,
    pub json_keys: Vec<String>,
}

/// Value-style validation outcome, for validate-then-branch call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedAddress>,
}

/// Validate an address and report the parsed parts or the first problem found.
pub fn validate_address(address: &str) -> AddressValidation {
    match HybridAddress::parse(address) {
        Ok(addr) => AddressValidation {
            is_valid: true,
            error: None,
            parsed: Some(addr.into_parts()),
        },
        Err(e) => AddressValidation {
            is_valid: false,
            error: Some(e.to_string()),
            parsed: None,
        },
    }
}

/// A validated hybrid address.
///
/// Construction always goes through the grammar, so a `HybridAddress` value is
/// known-good wherever it travels. It serializes as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HybridAddress {
    ltree_path: String,
    json_keys: Vec<String>,
}

impl HybridAddress {
    /// Parse and validate an address string.
    ///
    /// The overall shape is checked before splitting, so `a#b#c` is rejected as a
    /// format error rather than being read as ltree `a` with key `b#c`.
    pub fn parse(address: &str) -> Result<Self, AddressFormatError> {
        if address.is_empty() {
            return Err(AddressFormatError::Empty);
        }
        if !ADDRESS_RE.is_match(address) {
            return Err(AddressFormatError::InvalidFormat {
                address: address.to_string(),
            });
        }

        let (ltree, json) = match address.split_once('#') {
            Some((l, j)) => (l, Some(j)),
            None => (address, None),
        };

        check_ltree(ltree)?;

        let mut json_keys = Vec::new();
        if let Some(json) = json {
            for key in json.split('.') {
                check_json_key(key)?;
                json_keys.push(key.to_string());
            }
        }

        Ok(Self {
            ltree_path: ltree.to_string(),
            json_keys,
        })
    }

    /// Build an address from already-split parts, validating each one.
    pub fn new<I, S>(ltree_path: &str, json_keys: I) -> Result<Self, AddressFormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if ltree_path.is_empty() {
            return Err(AddressFormatError::Empty);
        }
        check_ltree(ltree_path)?;

        let json_keys: Vec<String> = json_keys.into_iter().map(Into::into).collect();
        for key in &json_keys {
            check_json_key(key)?;
        }

        Ok(Self {
            ltree_path: ltree_path.to_string(),
            json_keys,
        })
    }

    pub fn ltree_path(&self) -> &str {
        &self.ltree_path
    }

    pub fn json_keys(&self) -> &[String] {
        &self.json_keys
    }

    pub fn ltree_segments(&self) -> impl Iterator<Item = &str> {
        self.ltree_path.split('.')
    }

    /// True when the address names the whole node content.
    pub fn is_node_address(&self) -> bool {
        self.json_keys.is_empty()
    }

    /// The same node, without the json part.
    pub fn node_only(&self) -> Self {
        Self {
            ltree_path: self.ltree_path.clone(),
            json_keys: Vec::new(),
        }
    }

    /// Descend one json key.
    pub fn child(&self, key: &str) -> Result<Self, AddressFormatError> {
        check_json_key(key)?;
        let mut json_keys = self.json_keys.clone();
        json_keys.push(key.to_string());
        Ok(Self {
            ltree_path: self.ltree_path.clone(),
            json_keys,
        })
    }

    pub fn into_parts(self) -> ParsedAddress {
        ParsedAddress {
            ltree_path: self.ltree_path,
            json_keys: self.json_keys,
        }
    }
}

fn check_ltree(path: &str) -> Result<(), AddressFormatError> {
    if LTREE_RE.is_match(path) {
        Ok(())
    } else {
        Err(AddressFormatError::InvalidLtreePath {
            path: path.to_string(),
        })
    }
}

fn check_json_key(key: &str) -> Result<(), AddressFormatError> {
    if JSON_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(AddressFormatError::InvalidJsonKey {
            key: key.to_string(),
        })
    }
}

impl fmt::Display for HybridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ltree_path)?;
        if !self.json_keys.is_empty() {
            write!(f, "#{}", self.json_keys.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for HybridAddress {
    type Err = AddressFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HybridAddress {
    type Error = AddressFormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<HybridAddress> for String {
    fn from(addr: HybridAddress) -> Self {
        addr.to_string()
    }
}
