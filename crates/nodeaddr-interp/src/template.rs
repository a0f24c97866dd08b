use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([^{}]*)\}\}")
        .expect("token pattern compiles")
});

/// Walk dot-separated keys into `context`.
///
/// Arrays are indexed by numeric keys. Returns `None` as soon as a key is
/// missing or an intermediate value is not a container; never panics.
pub fn get_nested_value<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = context;
    for key in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replace every `{{ path }}` token in `template`.
///
/// Whitespace around the path is ignored. A token whose path does not resolve
/// is left exactly as written.
pub fn interpolate_string(template: &str, context: &Value) -> String {
    TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let path = caps[1].trim();
            match get_nested_value(context, path) {
                Some(v) => render(v),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Rewrite all string leaves of `value`. Containers are rebuilt, never mutated.
pub fn interpolate_json(value: &Value, context: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate_string(s, context)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_json(item, context))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), interpolate_json(v, context));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// True when any string leaf still contains a `{{...}}` token.
pub fn has_interpolation_tokens(value: &Value) -> bool {
    match value {
        Value::String(s) => TOKEN_RE.is_match(s),
        Value::Array(items) => items.iter().any(has_interpolation_tokens),
        Value::Object(map) => map.values().any(has_interpolation_tokens),
        _ => false,
    }
}

/// All token paths found in string leaves, trimmed, in first-seen order and
/// without duplicates.
pub fn extract_tokens(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_tokens(value, &mut out);
    out
}

/// Token paths that would be left verbatim by [`interpolate_json`].
pub fn unresolved_tokens(value: &Value, context: &Value) -> Vec<String> {
    extract_tokens(value)
        .into_iter()
        .filter(|path| get_nested_value(context, path).is_none())
        .collect()
}

fn collect_tokens(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in TOKEN_RE.captures_iter(s) {
                let path = caps[1].trim();
                if !out.iter().any(|seen| seen == path) {
                    out.push(path.to_string());
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_tokens(item, out)),
        Value::Object(map) => map.values().for_each(|v| collect_tokens(v, out)),
        _ => {}
    }
}

// Strings are inserted raw; everything else uses its compact JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
