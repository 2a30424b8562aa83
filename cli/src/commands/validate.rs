//! Validate command

use super::{read_values, Context};
use colored::Colorize;
use formsmith_core::derive::resolve_derived;
use formsmith_core::validation::{validate_all, FieldFailure};
use std::path::Path;
use tabled::Tabled;

#[derive(serde::Serialize, Tabled)]
struct FailureRow {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&FieldFailure> for FailureRow {
    fn from(failure: &FieldFailure) -> Self {
        Self {
            key: failure.key.clone(),
            message: failure.message.clone(),
        }
    }
}

/// Derived fields are resolved first, so they are checked with the values a
/// filled-in form would hold.
pub fn handle(form: &str, values: &Path, ctx: &Context) -> anyhow::Result<()> {
    let form = ctx.load_form(form)?;
    let values = resolve_derived(&form.fields, &read_values(values)?);
    let report = validate_all(&form.fields, &values);

    if ctx.format.is_table() {
        if report.is_valid() {
            println!("{} {}", "✔".green(), "All fields valid".green());
            return Ok(());
        }
        let rows: Vec<FailureRow> = report.failures.iter().map(FailureRow::from).collect();
        ctx.format.print_rows(&rows)?;
    } else {
        ctx.format.print(&report)?;
    }

    if !report.is_valid() {
        anyhow::bail!("{} field(s) failed validation", report.failures.len());
    }
    Ok(())
}
