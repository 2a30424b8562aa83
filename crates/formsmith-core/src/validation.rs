//! Field validation
//!
//! Rules run in a fixed order and the first failing rule wins:
//! `required`, `minLength`/`maxLength`, `email`, `passwordStrength`.
//! A failure is an ordinary message, never an error value.

use crate::domain::{Field, FieldKind, ValueSet};
use regex::Regex;
use serde::Serialize;
use serde_json::Value as Json;
use std::borrow::Cow;
use std::sync::LazyLock;

// Search, not a full match: "name@host.tld" anywhere in the text passes.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s@]+@[^\s@]+\.[^\s@]+").expect("valid email pattern"));

const MIN_PASSWORD_LEN: usize = 8;

/// Validate one value against its field's rules.
///
/// Returns the message of the first failing rule, or `None` when the value
/// passes (or the field has no rules).
pub fn validate(field: &Field, value: &Json) -> Option<String> {
    let rules = field.validations.as_ref()?;

    if rules.is_required() && is_empty(&field.kind, value) {
        return Some(format!("{} is required", field.label));
    }

    // Length, email and password rules only look at text. An unset value
    // counts as empty text.
    let text = match value {
        Json::String(s) => s.as_str(),
        Json::Null => "",
        _ => return None,
    };
    let len = text.chars().count();

    if let Some(min) = rules.min_length {
        if len < min as usize {
            return Some(format!("{} must be at least {} characters", field.label, min));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max as usize {
            return Some(format!("{} must be at most {} characters", field.label, max));
        }
    }
    if rules.wants_email() && !text.is_empty() && !EMAIL.is_match(text) {
        return Some("Enter a valid email".to_string());
    }
    if rules.wants_password_strength() && !text.is_empty() && !is_strong_password(text, len) {
        return Some("Password must be >= 8 chars and include a number".to_string());
    }
    None
}

fn is_empty(kind: &FieldKind, value: &Json) -> bool {
    match kind {
        FieldKind::Checkbox { .. } => !value.is_boolean(),
        FieldKind::Text { .. }
        | FieldKind::Number { .. }
        | FieldKind::Textarea { .. }
        | FieldKind::Select { .. }
        | FieldKind::Radio { .. }
        | FieldKind::Date { .. } => string_form(value).trim().is_empty(),
    }
}

fn is_strong_password(text: &str, len: usize) -> bool {
    len >= MIN_PASSWORD_LEN && text.chars().any(|c| c.is_ascii_digit())
}

/// Text a value displays as; `null` shows as nothing.
pub(crate) fn string_form(value: &Json) -> Cow<'_, str> {
    match value {
        Json::Null => Cow::Borrowed(""),
        Json::String(s) => Cow::Borrowed(s.as_str()),
        Json::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Json::Number(n) => Cow::Owned(n.to_string()),
        Json::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| string_form(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Json::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// A field that failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub key: String,
    pub message: String,
}

/// Outcome of validating every field of a form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Failures in schema order.
    pub failures: Vec<FieldFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Message for one field key, if it failed.
    pub fn message(&self, key: &str) -> Option<&str> {
        self.failures
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.message.as_str())
    }
}

/// Validate every field against its current value.
///
/// Keys missing from `values` are validated as `null`.
pub fn validate_all(fields: &[Field], values: &ValueSet) -> ValidationReport {
    let failures = fields
        .iter()
        .filter_map(|field| {
            let value = values.get(&field.key).unwrap_or(&Json::Null);
            validate(field, value).map(|message| FieldFailure {
                key: field.key.clone(),
                message,
            })
        })
        .collect();
    ValidationReport { failures }
}
