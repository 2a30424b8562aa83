//! Form editor state
//!
//! Holds the schema being edited and the selected field. Field order here is
//! the order derived fields are later resolved in.

use crate::domain::aggregates::{created_now, short_id};
use crate::domain::{DerivedConfig, Field, FieldKind, FieldOption, FieldType, FormSchema, ValidationRules};
use crate::error::{FormsError, FormsResult};
use tracing::debug;

const WORKING_ID: &str = "current";
const UNTITLED: &str = "Untitled Form";

/// Direction for [`FormBuilder::move_field`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Debug)]
pub struct FormBuilder {
    schema: FormSchema,
    selected: Option<String>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            schema: FormSchema::new(WORKING_ID),
            selected: None,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn fields(&self) -> &[Field] {
        &self.schema.fields
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Field> {
        self.selected.as_deref().and_then(|id| self.schema.field_by_id(id))
    }

    /// Drop everything and start an empty schema.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Load an existing schema for editing and select its first field.
    pub fn set_schema(&mut self, schema: FormSchema) {
        self.selected = schema.fields.first().map(|f| f.id.clone());
        self.schema = schema;
    }

    /// Append a field of the given type with editor defaults and select it.
    pub fn add_field(&mut self, field_type: FieldType) -> &Field {
        let field = new_field(field_type);
        debug!(id = %field.id, field_type = %field_type, "field added");
        self.selected = Some(field.id.clone());
        self.schema.fields.push(field);
        &self.schema.fields[self.schema.fields.len() - 1]
    }

    /// Apply `change` to the field with `id`.
    pub fn update_field<F>(&mut self, id: &str, change: F) -> FormsResult<()>
    where
        F: FnOnce(&mut Field),
    {
        let field = self
            .schema
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormsError::FieldNotFound(id.to_string()))?;
        change(field);
        Ok(())
    }

    /// Remove a field. The selection moves to the field that took its place,
    /// or the one before it when the last field was removed.
    pub fn delete_field(&mut self, id: &str) -> FormsResult<Field> {
        let index = self.position(id)?;
        let removed = self.schema.fields.remove(index);
        self.selected = self
            .schema
            .fields
            .get(index)
            .or_else(|| index.checked_sub(1).and_then(|i| self.schema.fields.get(i)))
            .map(|f| f.id.clone());
        Ok(removed)
    }

    /// Swap a field with its neighbour. Returns `false` when it is already
    /// at that edge.
    pub fn move_field(&mut self, id: &str, direction: Direction) -> FormsResult<bool> {
        let index = self.position(id)?;
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < self.schema.fields.len()),
        };
        match target {
            Some(target) => {
                self.schema.fields.swap(index, target);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Select a field by id, or clear the selection.
    pub fn select_field(&mut self, id: Option<&str>) -> FormsResult<()> {
        if let Some(id) = id {
            self.position(id)?;
        }
        self.selected = id.map(str::to_string);
        Ok(())
    }

    /// Snapshot the fields as a new saved form.
    pub fn save_as(&self, name: &str) -> FormsResult<FormSchema> {
        if self.schema.fields.is_empty() {
            return Err(FormsError::EmptyForm);
        }
        let name = name.trim();
        Ok(FormSchema {
            id: short_id(),
            name: Some(if name.is_empty() { UNTITLED } else { name }.to_string()),
            created_at: created_now(),
            fields: self.schema.fields.clone(),
        })
    }

    fn position(&self, id: &str) -> FormsResult<usize> {
        self.schema
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FormsError::FieldNotFound(id.to_string()))
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn new_field(field_type: FieldType) -> Field {
    let id = short_id();
    let kind = match field_type {
        FieldType::Select => FieldKind::Select {
            default_value: None,
            options: Some(default_options()),
        },
        FieldType::Radio => FieldKind::Radio {
            default_value: None,
            options: Some(default_options()),
        },
        FieldType::Checkbox => FieldKind::Checkbox {
            default_value: Some(false),
        },
        other => FieldKind::blank(other),
    };
    Field::new(format!("field_{id}"), format!("{} Field", field_type.title()), kind)
        .with_id(id)
        .with_validations(ValidationRules {
            required: Some(false),
            ..ValidationRules::default()
        })
        .with_derived(DerivedConfig::disabled())
}

fn default_options() -> Vec<FieldOption> {
    vec![
        FieldOption::new("Option 1", "option1"),
        FieldOption::new("Option 2", "option2"),
    ]
}
