//! Lint command

use super::Context;
use colored::Colorize;
use formsmith_core::derive::{lint_formulas, FormulaIssue};
use tabled::Tabled;

#[derive(serde::Serialize, Tabled)]
struct IssueRow {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Issue")]
    issue: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<FormulaIssue> for IssueRow {
    fn from(issue: FormulaIssue) -> Self {
        match issue {
            FormulaIssue::Syntax { key, message } => Self { key, issue: "syntax", detail: message },
            FormulaIssue::UnknownReference { key, name } => Self {
                key,
                issue: "unknown reference",
                detail: format!("'{}' is not a field key", name),
            },
            FormulaIssue::UnknownFunction { key, name } => Self {
                key,
                issue: "unknown function",
                detail: format!("'{}' is not a built-in", name),
            },
            FormulaIssue::ShadowedKey { key } => Self {
                detail: format!("formulas reading '{}' get the built-in function", key),
                key,
                issue: "shadowed key",
            },
        }
    }
}

pub fn handle(form: &str, ctx: &Context) -> anyhow::Result<()> {
    let form = ctx.load_form(form)?;
    let issues = lint_formulas(&form.fields);

    if !ctx.format.is_table() {
        return ctx.format.print(&issues);
    }
    if issues.is_empty() {
        println!("{} {}", "✔".green(), "No formula issues".green());
        return Ok(());
    }
    let rows: Vec<IssueRow> = issues.into_iter().map(IssueRow::from).collect();
    ctx.format.print_rows(&rows)
}
