//! Bracket-to-dot path normalization.
//!
//! Ltree segments cannot contain brackets and cannot start with a digit, so
//! `a[0]` becomes `a.i0` and `a["k"]` / `a['k']` become `a.k`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BRACKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[(?:(\d+)|"([^"\]]*)"|'([^'\]]*)')\]"#)
        .expect("bracket pattern compiles")
});

/// Rewrite bracket notation into dot notation.
///
/// Numeric indices get an `i` prefix. Anything that is not a numeric index or a
/// quoted key is left untouched for the grammar to reject later.
pub fn normalize_path(path: &str) -> String {
    let replaced = BRACKET_RE.replace_all(path, |caps: &Captures<'_>| {
        if let Some(idx) = caps.get(1) {
            format!(".i{}", idx.as_str())
        } else {
            let key = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            format!(".{key}")
        }
    });

    match replaced.strip_prefix('.') {
        Some(rest) => rest.to_string(),
        None => replaced.into_owned(),
    }
}
