//! Evaluation context: the flat namespace a formula sees

use super::builtins::BUILTINS;
use super::value::Value;
use super::EvalError;
use crate::domain::ValueSet;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Signature of a built-in function.
pub type Builtin = fn(&EvalContext, &[Value]) -> Result<Value, EvalError>;

/// What a name is bound to.
#[derive(Clone)]
pub enum Binding {
    Value(Value),
    Function(Builtin),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Binding::Function(_) => f.write_str("Function"),
        }
    }
}

/// Names visible to a formula: field values plus the built-in functions.
///
/// Built-ins are merged last, so a field whose key equals a built-in name is
/// shadowed by the built-in.
#[derive(Debug, Clone)]
pub struct EvalContext {
    bindings: HashMap<String, Binding>,
    now: DateTime<Utc>,
}

impl EvalContext {
    /// Context holding only the built-ins, with `today()` pinned to now.
    pub fn new() -> Self {
        Self::empty_at(Utc::now())
    }

    /// Context over a value set, with `today()` pinned to now.
    pub fn from_values(values: &ValueSet) -> Self {
        Self::from_values_at(values, Utc::now())
    }

    /// Context over a value set, with `today()` pinned to `now`.
    pub fn from_values_at(values: &ValueSet, now: DateTime<Utc>) -> Self {
        let mut ctx = Self::empty_at(now);
        for (key, value) in values {
            ctx.bind(key.clone(), Value::from_json(value));
        }
        ctx
    }

    fn empty_at(now: DateTime<Utc>) -> Self {
        let bindings = BUILTINS
            .iter()
            .map(|(name, f)| (name.to_string(), Binding::Function(*f)))
            .collect();
        Self { bindings, now }
    }

    /// Pin the instant `today()` returns.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Bind a variable. Returns `false`, leaving the built-in in place, when
    /// the name is a built-in function.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        if Self::is_builtin(&name) {
            warn!(key = %name, "field key shadowed by built-in function");
            return false;
        }
        self.bindings.insert(name, Binding::Value(value.into()));
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn is_builtin(name: &str) -> bool {
        BUILTINS.iter().any(|(builtin, _)| *builtin == name)
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_are_bound() {
        let values: ValueSet = [("a".to_string(), json!(2)), ("name".to_string(), json!("Ann"))]
            .into_iter()
            .collect();
        let ctx = EvalContext::from_values(&values);
        assert!(matches!(ctx.lookup("a"), Some(Binding::Value(Value::Number(n))) if *n == 2.0));
        assert!(matches!(ctx.lookup("name"), Some(Binding::Value(Value::Text(s))) if s == "Ann"));
        assert!(ctx.lookup("missing").is_none());
    }

    #[test]
    fn test_builtins_shadow_field_keys() {
        let values: ValueSet = [("len".to_string(), json!(3))].into_iter().collect();
        let ctx = EvalContext::from_values(&values);
        assert!(matches!(ctx.lookup("len"), Some(Binding::Function(_))));

        let mut ctx = EvalContext::new();
        assert!(!ctx.bind("today", 1.0));
        assert!(ctx.bind("total", 1.0));
    }
}
