//! Field values checked against their registry entries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::FormItem;
use crate::registry::{Datatype, FieldRegistry, FieldRegistryEntry};
use crate::resolve::collect_field_slots;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    UnknownField,
    TypeMismatch,
    TooShort,
    TooLong,
    PatternMismatch,
    InvalidPattern,
    BelowMinimum,
    AboveMaximum,
    TooFewItems,
    TooManyItems,
    DuplicateItems,
    NotAnOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub code: IssueCode,
    pub path: String,
    pub field_ref: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldValidationOptions {
    /// Check choice widgets (`select`, `radio`, `tags`) against `options`.
    pub check_options: bool,
}

impl Default for FieldValidationOptions {
    fn default() -> Self {
        Self {
            check_options: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValidationReport {
    pub issues: Vec<FieldIssue>,
}

impl FormValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldIssue> + 'a {
        self.issues.iter().filter(move |i| i.path == path)
    }
}

/// Check one value. An empty value (missing, null or `""`) only fails when the
/// field is required; no other rule applies to it. `[]` is a present value.
pub fn validate_field(
    entry: &FieldRegistryEntry,
    required: bool,
    path: &str,
    value: Option<&Value>,
    opts: &FieldValidationOptions,
) -> Vec<FieldIssue> {
    let mut out = Issues {
        path,
        field_ref: &entry.field_id,
        list: Vec::new(),
    };

    let value = match value {
        Some(v) if !is_empty(v) => v,
        _ => {
            if required {
                out.push(IssueCode::Required, "a value is required");
            }
            return out.list;
        }
    };

    match entry.datatype {
        Datatype::Text => check_text(entry, value, &mut out),
        Datatype::Number => check_number(entry, value, false, &mut out),
        Datatype::Integer => check_number(entry, value, true, &mut out),
        Datatype::Boolean => {
            if !value.is_boolean() {
                out.push(IssueCode::TypeMismatch, "expected a boolean");
            }
        }
        Datatype::Array => check_array(entry, value, &mut out),
        Datatype::Other => {}
    }

    if opts.check_options && entry.is_choice_widget() && !entry.options.is_empty() {
        check_options(entry, value, &mut out);
    }

    out.list
}

/// Check every field occurrence of a form tree.
///
/// `form_values` maps field paths to pending values and takes precedence over
/// values stored on the items themselves.
pub fn validate_form(
    items: &[Arc<FormItem>],
    root: &str,
    registry: &FieldRegistry,
    form_values: &BTreeMap<String, Value>,
    opts: &FieldValidationOptions,
) -> FormValidationReport {
    let mut report = FormValidationReport::default();

    for slot in collect_field_slots(items, root) {
        let Some(entry) = registry.get(slot.item_ref) else {
            report.issues.push(FieldIssue {
                code: IssueCode::UnknownField,
                path: slot.path.clone(),
                field_ref: slot.item_ref.to_string(),
                message: format!("no registry entry for '{}'", slot.item_ref),
            });
            continue;
        };
        let value = form_values.get(&slot.path).or(slot.value);
        let issues = validate_field(entry, slot.required, &slot.path, value, opts);
        report.issues.extend(issues);
    }

    report
}

struct Issues<'a> {
    path: &'a str,
    field_ref: &'a str,
    list: Vec<FieldIssue>,
}

impl Issues<'_> {
    fn push(&mut self, code: IssueCode, message: impl Into<String>) {
        self.list.push(FieldIssue {
            code,
            path: self.path.to_string(),
            field_ref: self.field_ref.to_string(),
            message: message.into(),
        });
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn check_text(entry: &FieldRegistryEntry, value: &Value, out: &mut Issues<'_>) {
    let Some(text) = value.as_str() else {
        out.push(IssueCode::TypeMismatch, "expected text");
        return;
    };
    let rules = &entry.rules;
    let len = text.chars().count();

    if let Some(min) = rules.min_length {
        if len < min {
            out.push(
                IssueCode::TooShort,
                format!("must be at least {min} characters"),
            );
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            out.push(
                IssueCode::TooLong,
                format!("must be at most {max} characters"),
            );
        }
    }
    if let Some(pattern) = rules.pattern.as_deref() {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(text) => {
                out.push(
                    IssueCode::PatternMismatch,
                    format!("must match /{pattern}/"),
                );
            }
            Ok(_) => {}
            Err(e) => out.push(
                IssueCode::InvalidPattern,
                format!("bad pattern /{pattern}/: {e}"),
            ),
        }
    }
}

fn check_number(entry: &FieldRegistryEntry, value: &Value, integer: bool, out: &mut Issues<'_>) {
    let Some(n) = value.as_f64() else {
        out.push(IssueCode::TypeMismatch, "expected a number");
        return;
    };
    if integer && !(value.is_i64() || value.is_u64() || n.fract() == 0.0) {
        out.push(IssueCode::TypeMismatch, "expected an integer");
        return;
    }

    if let Some(min) = entry.rules.minimum {
        if n < min {
            out.push(IssueCode::BelowMinimum, format!("must be >= {min}"));
        }
    }
    if let Some(max) = entry.rules.maximum {
        if n > max {
            out.push(IssueCode::AboveMaximum, format!("must be <= {max}"));
        }
    }
}

fn check_array(entry: &FieldRegistryEntry, value: &Value, out: &mut Issues<'_>) {
    let Some(list) = value.as_array() else {
        out.push(IssueCode::TypeMismatch, "expected a list");
        return;
    };
    let rules = &entry.rules;

    if let Some(min) = rules.min_items {
        if list.len() < min {
            out.push(
                IssueCode::TooFewItems,
                format!("needs at least {min} item(s)"),
            );
        }
    }
    if let Some(max) = rules.max_items {
        if list.len() > max {
            out.push(
                IssueCode::TooManyItems,
                format!("allows at most {max} item(s)"),
            );
        }
    }
    if rules.unique_items == Some(true) {
        let mut seen = BTreeSet::new();
        if !list.iter().all(|v| seen.insert(v.to_string())) {
            out.push(IssueCode::DuplicateItems, "items must be unique");
        }
    }
}

fn check_options(entry: &FieldRegistryEntry, value: &Value, out: &mut Issues<'_>) {
    let allowed = |v: &Value| entry.options.iter().any(|o| &o.value == v);

    if entry.widget == "tags" {
        let list = match value {
            Value::Array(list) => list.as_slice(),
            single => std::slice::from_ref(single),
        };
        for v in list.iter().filter(|v| !allowed(v)) {
            out.push(
                IssueCode::NotAnOption,
                format!("{v} is not one of the options"),
            );
        }
    } else if !allowed(value) {
        out.push(
            IssueCode::NotAnOption,
            format!("{value} is not one of the options"),
        );
    }
}
