//! Formula language for derived fields
//!
//! A restricted expression language: literals, field keys as variables,
//! arithmetic, comparison, `and`/`or`/`not`, `||` concatenation, `?:` and
//! calls to the built-in helpers. There are no loops, assignments or
//! user-defined functions, so every evaluation terminates.
//!
//! ```
//! use formsmith_core::expr::{evaluate, EvalContext, Value};
//!
//! let mut ctx = EvalContext::new();
//! ctx.bind("price", 12.5);
//! ctx.bind("qty", 4.0);
//! assert_eq!(evaluate("price * qty", &ctx).unwrap(), Value::Number(50.0));
//! ```

pub mod ast;
pub mod builtins;
pub mod context;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::Expr;
pub use builtins::parse_date;
pub use context::{Binding, Builtin, EvalContext};
pub use parser::parse;
pub use value::Value;

use thiserror::Error;

/// Why a formula could not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("'{0}' is not a function")]
    NotCallable(String),

    #[error("function '{0}' used as a value")]
    FunctionAsValue(String),

    #[error("{function}() takes {expected} argument(s), got {found}")]
    Arity {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

impl EvalError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        EvalError::Parse {
            position,
            message: message.into(),
        }
    }
}

/// A parsed formula, reusable across evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, EvalError> {
        Ok(Self {
            source: source.to_string(),
            expr: parser::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self, ctx: &EvalContext) -> Result<Value, EvalError> {
        eval::eval(&self.expr, ctx)
    }

    /// Variable names the formula reads.
    pub fn references(&self) -> Vec<String> {
        self.expr.references()
    }
}

/// Parse and evaluate a formula in one step.
pub fn evaluate(formula: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
    Formula::parse(formula)?.evaluate(ctx)
}

/// Variable names a formula reads, or the parse error.
pub fn references(formula: &str) -> Result<Vec<String>, EvalError> {
    Ok(parser::parse(formula)?.references())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValueSet;
    use serde_json::json;

    #[test]
    fn test_evaluate_against_values() {
        let values: ValueSet = [
            ("first".to_string(), json!("Ada")),
            ("last".to_string(), json!("Lovelace")),
        ]
        .into_iter()
        .collect();
        let ctx = EvalContext::from_values(&values);
        assert_eq!(
            evaluate("concat(first, ' ' || last)", &ctx).unwrap(),
            Value::from("Ada Lovelace")
        );
    }

    #[test]
    fn test_formula_is_reusable() {
        let formula = Formula::parse("x * 2").unwrap();
        let mut ctx = EvalContext::new();
        ctx.bind("x", 2.0);
        assert_eq!(formula.evaluate(&ctx).unwrap(), Value::Number(4.0));
        ctx.bind("x", 5.0);
        assert_eq!(formula.evaluate(&ctx).unwrap(), Value::Number(10.0));
        assert_eq!(formula.source(), "x * 2");
        assert_eq!(formula.references(), vec!["x".to_string()]);
    }

    #[test]
    fn test_errors_surface() {
        let ctx = EvalContext::new();
        assert!(matches!(evaluate("1 +", &ctx), Err(EvalError::Parse { .. })));
        assert_eq!(
            evaluate("ghost", &ctx),
            Err(EvalError::UnknownIdentifier("ghost".into()))
        );
        assert_eq!(references("a + len(b)").unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
