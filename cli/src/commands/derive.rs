//! Derive command

use super::{cell, read_values, Context};
use chrono::Utc;
use colored::Colorize;
use formsmith_core::derive::resolve_derived_with;
use std::path::Path;
use tabled::Tabled;

#[derive(serde::Serialize, Tabled)]
struct DerivedRow {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn handle(form: &str, values: &Path, ctx: &Context) -> anyhow::Result<()> {
    let form = ctx.load_form(form)?;
    let values = read_values(values)?;

    let mut failures = Vec::new();
    let resolved = resolve_derived_with(&form.fields, &values, Utc::now(), |field, err| {
        failures.push(format!("{}: {}", field.key, err));
    });

    if ctx.format.is_table() {
        let rows: Vec<DerivedRow> = form
            .fields
            .iter()
            .filter(|f| f.is_derived())
            .map(|f| DerivedRow {
                key: f.key.clone(),
                value: resolved.get(&f.key).map(cell).unwrap_or_default(),
            })
            .collect();
        ctx.format.print_rows(&rows)?;
    } else {
        ctx.format.print(&resolved)?;
    }

    for failure in &failures {
        eprintln!("{} {}", "skipped".yellow(), failure);
    }
    Ok(())
}
