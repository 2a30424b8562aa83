//! Eval command

use super::Context;
use anyhow::Context as _;
use formsmith_core::expr::{evaluate, EvalContext};
use serde_json::Value as Json;

/// Parse a `key=value` binding. The value is read as JSON when it parses,
/// otherwise taken as text.
pub fn parse_var(raw: &str) -> Result<(String, Json), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Json::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn handle(formula: &str, vars: Vec<(String, Json)>, ctx: &Context) -> anyhow::Result<()> {
    let mut eval_ctx = EvalContext::new();
    for (key, value) in vars {
        if !eval_ctx.bind(key.clone(), &value) {
            tracing::warn!(key = %key, "variable ignored: name is a built-in function");
        }
    }
    let value = evaluate(formula, &eval_ctx).with_context(|| format!("evaluating '{}'", formula))?;

    if ctx.format.is_table() {
        println!("{}", value);
        Ok(())
    } else {
        ctx.format.print(&value.to_json())
    }
}
