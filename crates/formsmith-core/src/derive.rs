//! Derived-value resolution
//!
//! One pass over the fields in schema order. Every formula is evaluated
//! against a single context built up front from the incoming values, so a
//! derived field never sees a value computed earlier in the same pass.
//! `DerivedConfig::parent_keys` plays no part in ordering.

use crate::domain::{Field, ValueSet};
use crate::expr::{EvalContext, EvalError, Formula};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Recompute every derived field.
///
/// Returns a copy of `values` with each successfully derived key
/// overwritten. A field whose formula fails keeps its previous value and the
/// failure is not reported.
pub fn resolve_derived(fields: &[Field], values: &ValueSet) -> ValueSet {
    resolve_derived_with(fields, values, Utc::now(), |_, _| {})
}

/// [`resolve_derived`] with a pinned `today()` and a diagnostics callback
/// invoked for every field whose formula fails.
pub fn resolve_derived_with<F>(
    fields: &[Field],
    values: &ValueSet,
    now: DateTime<Utc>,
    mut on_error: F,
) -> ValueSet
where
    F: FnMut(&Field, &EvalError),
{
    let ctx = EvalContext::from_values_at(values, now);
    let mut resolved = values.clone();

    for field in fields {
        let Some(derived) = field.derived.as_ref().filter(|d| d.is_active()) else {
            continue;
        };
        match Formula::parse(&derived.formula).and_then(|f| f.evaluate(&ctx)) {
            Ok(value) => {
                resolved.insert(field.key.clone(), value.to_json());
            }
            Err(err) => {
                debug!(key = %field.key, error = %err, "derived value left unchanged");
                on_error(field, &err);
            }
        }
    }
    resolved
}

/// A problem found in a derived field's formula.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum FormulaIssue {
    /// The formula does not parse.
    Syntax { key: String, message: String },
    /// The formula reads a name that is neither a field key nor a built-in,
    /// typically a key that was renamed.
    UnknownReference { key: String, name: String },
    /// The formula calls a function that does not exist.
    UnknownFunction { key: String, name: String },
    /// A field key equals a built-in name; formulas see the built-in.
    ShadowedKey { key: String },
}

/// Check every active formula against the form's keys.
///
/// Diagnostic only: resolution is unaffected by what this reports.
pub fn lint_formulas(fields: &[Field]) -> Vec<FormulaIssue> {
    let keys: HashSet<&str> = fields.iter().map(|f| f.key.as_str()).collect();
    let mut issues: Vec<FormulaIssue> = fields
        .iter()
        .filter(|f| EvalContext::is_builtin(&f.key))
        .map(|f| FormulaIssue::ShadowedKey { key: f.key.clone() })
        .collect();

    for field in fields {
        let Some(derived) = field.derived.as_ref().filter(|d| d.is_active()) else {
            continue;
        };
        let formula = match Formula::parse(&derived.formula) {
            Ok(formula) => formula,
            Err(err) => {
                issues.push(FormulaIssue::Syntax {
                    key: field.key.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        for name in formula.references() {
            if !keys.contains(name.as_str()) && !EvalContext::is_builtin(&name) {
                issues.push(FormulaIssue::UnknownReference {
                    key: field.key.clone(),
                    name,
                });
            }
        }
        for name in formula.expr().calls() {
            if !EvalContext::is_builtin(&name) {
                issues.push(FormulaIssue::UnknownFunction {
                    key: field.key.clone(),
                    name,
                });
            }
        }
    }
    issues
}
