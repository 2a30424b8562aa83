//! Form aggregate and its field entities
use crate::domain::value_objects::{DerivedConfig, FieldOption, FieldType, NumberDefault, ValidationRules};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as Json;

/// Type-specific part of a field.
///
/// Serialized as the `type` tag plus the attributes the type allows, so a
/// stored field stays one flat JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    Number {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<NumberDefault>,
    },
    Textarea {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    Select {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<FieldOption>>,
    },
    Radio {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<FieldOption>>,
    },
    Checkbox {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<bool>,
    },
    Date {
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
}

impl FieldKind {
    /// Kind with no default and no options.
    pub fn blank(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text { default_value: None },
            FieldType::Number => FieldKind::Number { default_value: None },
            FieldType::Textarea => FieldKind::Textarea { default_value: None },
            FieldType::Select => FieldKind::Select { default_value: None, options: None },
            FieldType::Radio => FieldKind::Radio { default_value: None, options: None },
            FieldType::Checkbox => FieldKind::Checkbox { default_value: None },
            FieldType::Date => FieldKind::Date { default_value: None },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Textarea { .. } => FieldType::Textarea,
            FieldKind::Select { .. } => FieldType::Select,
            FieldKind::Radio { .. } => FieldType::Radio,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::Date { .. } => FieldType::Date,
        }
    }

    /// Configured default as a JSON value.
    pub fn default_value(&self) -> Option<Json> {
        match self {
            FieldKind::Text { default_value }
            | FieldKind::Textarea { default_value }
            | FieldKind::Select { default_value, .. }
            | FieldKind::Radio { default_value, .. }
            | FieldKind::Date { default_value } => default_value.clone().map(Json::String),
            FieldKind::Number { default_value } => default_value.as_ref().map(NumberDefault::to_json),
            FieldKind::Checkbox { default_value } => default_value.map(Json::Bool),
        }
    }

    /// Options of a select or radio field; empty for every other kind.
    pub fn options(&self) -> &[FieldOption] {
        match self {
            FieldKind::Select { options, .. } | FieldKind::Radio { options, .. } => {
                options.as_deref().unwrap_or(&[])
            }
            FieldKind::Text { .. }
            | FieldKind::Number { .. }
            | FieldKind::Textarea { .. }
            | FieldKind::Checkbox { .. }
            | FieldKind::Date { .. } => &[],
        }
    }
}

/// A single typed input slot of a form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    /// Value-map key and formula variable name; unique within a form.
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedConfig>,
}

impl Field {
    /// Field with a generated id and no rules.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: short_id(),
            key: key.into(),
            label: label.into(),
            kind,
            validations: None,
            derived: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_validations(mut self, rules: ValidationRules) -> Self {
        self.validations = Some(rules);
        self
    }

    pub fn with_derived(mut self, derived: DerivedConfig) -> Self {
        self.derived = Some(derived);
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn default_value(&self) -> Option<Json> {
        self.kind.default_value()
    }

    pub fn options(&self) -> &[FieldOption] {
        self.kind.options()
    }

    /// Derived fields are computed, not typed in.
    pub fn is_derived(&self) -> bool {
        self.derived.as_ref().is_some_and(|d| d.enabled)
    }

    /// Value a fresh form instance starts with.
    pub fn initial_value(&self) -> Json {
        match self.default_value() {
            Some(value) => value,
            None if self.field_type() == FieldType::Checkbox => Json::Bool(false),
            None => Json::String(String::new()),
        }
    }
}

/// Current time at the millisecond precision `createdAt` is stored with.
pub fn created_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// `2024-01-01T00:00:00.000Z`, always with three fractional digits.
fn serialize_millis<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A named, ordered list of fields.
///
/// Field order is both display order and derived-field evaluation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FormSchema {
    /// Empty, unnamed schema stamped with the current time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            created_at: created_now(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn field_by_id(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Seven-character random identifier.
pub(crate) fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(7);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_select() -> Field {
        Field {
            id: "f1".into(),
            key: "colour".into(),
            label: "Colour".into(),
            kind: FieldKind::Select {
                default_value: Some("red".into()),
                options: Some(vec![FieldOption::new("Red", "red"), FieldOption::new("Blue", "blue")]),
            },
            validations: Some(ValidationRules {
                required: Some(true),
                min_length: Some(1),
                max_length: Some(10),
                email: Some(false),
                password_strength: Some(false),
            }),
            derived: Some(DerivedConfig::formula("concat(a, b)").with_parents(["a", "b"])),
        }
    }

    #[test]
    fn test_field_serializes_flat() {
        let encoded = serde_json::to_value(full_select()).unwrap();
        assert_eq!(
            encoded,
            json!({
                "id": "f1",
                "key": "colour",
                "label": "Colour",
                "type": "select",
                "defaultValue": "red",
                "options": [{"label": "Red", "value": "red"}, {"label": "Blue", "value": "blue"}],
                "validations": {
                    "required": true,
                    "minLength": 1,
                    "maxLength": 10,
                    "email": false,
                    "passwordStrength": false
                },
                "derived": {"enabled": true, "parentKeys": ["a", "b"], "formula": "concat(a, b)"}
            })
        );
    }

    #[test]
    fn test_schema_round_trip_is_lossless() {
        let checkbox_false = Field::new("agree", "Agree", FieldKind::Checkbox { default_value: Some(false) })
            .with_id("f2")
            .with_validations(ValidationRules::default());
        let checkbox_absent = Field::new("optin", "Opt in", FieldKind::Checkbox { default_value: None })
            .with_id("f3");
        let number_text = Field::new("age", "Age", FieldKind::Number {
            default_value: Some(NumberDefault::Text("18".into())),
        })
        .with_id("f4");
        let schema = FormSchema {
            id: "form-1".into(),
            name: Some("Signup".into()),
            created_at: "2024-03-01T10:15:30.250Z".parse().unwrap(),
            fields: vec![full_select(), checkbox_false, checkbox_absent, number_text],
        };

        let text = serde_json::to_string(&schema).unwrap();
        let back: FormSchema = serde_json::from_str(&text).unwrap();
        assert_eq!(back, schema);

        let raw: Json = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["fields"][1]["defaultValue"], json!(false));
        assert_eq!(raw["fields"][1]["validations"], json!({}));
        assert!(raw["fields"][2].get("defaultValue").is_none());
        assert!(raw["fields"][2].get("validations").is_none());
        assert_eq!(raw["fields"][3]["defaultValue"], json!("18"));
        assert_eq!(raw["createdAt"], json!("2024-03-01T10:15:30.250Z"));
    }

    #[test]
    fn test_created_at_keeps_its_text() {
        let stored = r#"{"id":"f","createdAt":"2024-01-01T00:00:00.000Z","fields":[]}"#;
        let schema: FormSchema = serde_json::from_str(stored).unwrap();
        assert_eq!(serde_json::to_string(&schema).unwrap(), stored);

        let fresh = FormSchema::new("g");
        let back: FormSchema = serde_json::from_str(&serde_json::to_string(&fresh).unwrap()).unwrap();
        assert_eq!(back, fresh);
    }

    #[test]
    fn test_parse_stored_form() {
        let stored = json!({
            "id": "abc1234",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "fields": [
                {"id": "x", "key": "n", "type": "number", "label": "N", "defaultValue": 3},
                {"id": "y", "key": "r", "type": "radio", "label": "R"}
            ]
        });
        let schema: FormSchema = serde_json::from_value(stored).unwrap();
        assert_eq!(schema.name, None);
        assert_eq!(schema.fields[0].default_value(), Some(json!(3)));
        assert_eq!(schema.fields[1].field_type(), FieldType::Radio);
        assert!(schema.fields[1].options().is_empty());
        assert_eq!(schema.display_name(), "abc1234");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let stored = json!({"id": "x", "key": "k", "type": "slider", "label": "K"});
        assert!(serde_json::from_value::<Field>(stored).is_err());
    }

    #[test]
    fn test_initial_values() {
        let text = Field::new("t", "T", FieldKind::blank(FieldType::Text));
        let check = Field::new("c", "C", FieldKind::blank(FieldType::Checkbox));
        let date = Field::new("d", "D", FieldKind::Date { default_value: Some("2024-01-01".into()) });
        assert_eq!(text.initial_value(), json!(""));
        assert_eq!(check.initial_value(), json!(false));
        assert_eq!(date.initial_value(), json!("2024-01-01"));
    }

    #[test]
    fn test_lookup_and_ids() {
        let field = Field::new("email", "Email", FieldKind::blank(FieldType::Text));
        assert_eq!(field.id.len(), 7);
        let schema = FormSchema::new("s").with_fields(vec![field.clone()]);
        assert_eq!(schema.field_by_key("email"), Some(&field));
        assert_eq!(schema.field_by_id(&field.id), Some(&field));
        assert!(schema.field_by_key("missing").is_none());
        assert!(!field.is_derived());
    }
}
