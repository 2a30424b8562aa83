//! Saved-form commands

use super::{read_document, Context};
use crate::FormCommands;
use anyhow::Context as _;
use colored::Colorize;
use formsmith_core::domain::{Field, FormSchema};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct FormRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Fields")]
    pub fields: usize,
    #[tabled(rename = "Created")]
    pub created: String,
}

impl From<&FormSchema> for FormRow {
    fn from(form: &FormSchema) -> Self {
        Self {
            id: form.id.clone(),
            name: form.name.clone().unwrap_or_else(|| "Untitled Form".into()),
            fields: form.fields.len(),
            created: form.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Type")]
    pub field_type: String,
    #[tabled(rename = "Required")]
    pub required: bool,
    #[tabled(rename = "Formula")]
    pub formula: String,
}

impl From<&Field> for FieldRow {
    fn from(field: &Field) -> Self {
        Self {
            key: field.key.clone(),
            label: field.label.clone(),
            field_type: field.field_type().to_string(),
            required: field.validations.as_ref().is_some_and(|v| v.is_required()),
            formula: field
                .derived
                .as_ref()
                .filter(|d| d.is_active())
                .map(|d| d.formula.clone())
                .unwrap_or_default(),
        }
    }
}

/// A schema file holds one form or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Many(Vec<FormSchema>),
    One(Box<FormSchema>),
}

pub fn handle(action: FormCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        FormCommands::List => {
            let library = ctx.library();
            if library.is_empty() && ctx.format.is_table() {
                println!("No saved forms");
                return Ok(());
            }
            let rows: Vec<FormRow> = library.forms().iter().map(FormRow::from).collect();
            ctx.format.print_rows(&rows)?;
        }
        FormCommands::Show { id } => {
            let library = ctx.library();
            let form = library
                .get(&id)
                .with_context(|| format!("form not found: {}", id))?;
            if ctx.format.is_table() {
                println!("{} ({})", form.display_name().bold(), form.id);
                let rows: Vec<FieldRow> = form.fields.iter().map(FieldRow::from).collect();
                ctx.format.print_rows(&rows)?;
            } else {
                ctx.format.print(form)?;
            }
        }
        FormCommands::Delete { id } => {
            let removed = ctx.library().delete_form(&id)?;
            println!("{} {}", "Deleted form".green(), removed.display_name());
        }
        FormCommands::Clear => {
            let mut library = ctx.library();
            let count = library.len();
            library.clear_all()?;
            println!("{} {} form(s)", "Cleared".green(), count);
        }
        FormCommands::Import { file } => {
            let forms = match read_document::<ImportDocument>(&file)? {
                ImportDocument::Many(forms) => forms,
                ImportDocument::One(form) => vec![*form],
            };
            let mut library = ctx.library();
            let count = forms.len();
            for form in forms {
                let issues = formsmith_core::lint_formulas(&form.fields);
                if !issues.is_empty() {
                    tracing::warn!(form = %form.id, issues = issues.len(), "imported form has formula issues");
                }
                library.save_form(form)?;
            }
            println!("{} {} form(s) into {}", "Imported".green(), count, ctx.store_path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsmith_core::domain::{DerivedConfig, FieldKind, FieldType, ValidationRules};

    #[test]
    fn test_field_row() {
        let field = Field::new("age", "Age", FieldKind::blank(FieldType::Number))
            .with_validations(ValidationRules::required())
            .with_derived(DerivedConfig::formula("yearsBetween(dob, today())"));
        let row = FieldRow::from(&field);
        assert_eq!(row.field_type, "number");
        assert!(row.required);
        assert_eq!(row.formula, "yearsBetween(dob, today())");
    }

    #[test]
    fn test_import_document_shapes() {
        let one: ImportDocument =
            serde_json::from_str(r#"{"id":"a","createdAt":"2024-01-01T00:00:00Z","fields":[]}"#).unwrap();
        assert!(matches!(one, ImportDocument::One(_)));
        let many: ImportDocument = serde_json::from_str(
            r#"[{"id":"a","createdAt":"2024-01-01T00:00:00Z","fields":[]}]"#,
        )
        .unwrap();
        assert!(matches!(many, ImportDocument::Many(ref v) if v.len() == 1));
    }
}
