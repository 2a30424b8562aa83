//! Form value objects
//!
//! Small, immutable pieces a field is assembled from. Every optional rule is
//! kept as an `Option` so that an absent flag and an explicit `false` survive
//! a JSON round-trip unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of input a field renders as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
    ];

    /// Wire name, as stored in the `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
        }
    }

    /// Human label used for freshly added fields ("Select Field").
    pub fn title(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Radio => "Radio",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
        }
    }

    /// Select and radio fields carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field type: {}", s))
    }
}

/// Validation rules attached to a field.
///
/// `min_length > max_length` is accepted and simply makes the field
/// unsatisfiable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    /// At least 8 characters and one decimal digit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_strength: Option<bool>,
}

impl ValidationRules {
    /// Rules with only `required` set.
    pub fn required() -> Self {
        Self {
            required: Some(true),
            ..Self::default()
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn wants_email(&self) -> bool {
        self.email.unwrap_or(false)
    }

    pub fn wants_password_strength(&self) -> bool {
        self.password_strength.unwrap_or(false)
    }
}

/// One entry of a select or radio field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Formula configuration of a derived field.
///
/// `parent_keys` records the intended dependencies for the editor; the
/// resolver does not use it for ordering or gating. A stored config without
/// the list keeps it absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_keys: Option<Vec<String>>,
    #[serde(default)]
    pub formula: String,
}

impl DerivedConfig {
    /// Enabled config with the given formula and no declared parents.
    pub fn formula(formula: impl Into<String>) -> Self {
        Self {
            enabled: true,
            parent_keys: Some(Vec::new()),
            formula: formula.into(),
        }
    }

    /// Disabled config as a new editor field carries it.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            parent_keys: Some(Vec::new()),
            formula: String::new(),
        }
    }

    /// Builder-style parent declaration.
    pub fn with_parents<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Enabled with something to evaluate.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.formula.is_empty()
    }
}

/// Default of a number field.
///
/// The editor stores whatever was typed, so persisted forms hold either a
/// JSON number or its text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberDefault {
    Number(serde_json::Number),
    Text(String),
}

impl NumberDefault {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            NumberDefault::Number(n) => serde_json::Value::Number(n.clone()),
            NumberDefault::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_wire_names() {
        for t in FieldType::ALL {
            let encoded = serde_json::to_value(t).unwrap();
            assert_eq!(encoded, json!(t.as_str()));
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), t);
        }
        assert!("slider".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_rules_keep_absent_and_false_apart() {
        let explicit: ValidationRules =
            serde_json::from_value(json!({"required": false})).unwrap();
        let empty: ValidationRules = serde_json::from_value(json!({})).unwrap();

        assert_eq!(explicit.required, Some(false));
        assert_eq!(empty.required, None);
        assert_eq!(serde_json::to_value(&explicit).unwrap(), json!({"required": false}));
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn test_derived_config_activity() {
        assert!(DerivedConfig::formula("a + b").is_active());
        assert!(!DerivedConfig::formula("").is_active());
        assert!(!DerivedConfig::default().is_active());

        let cfg = DerivedConfig::formula("a").with_parents(["a"]);
        assert_eq!(
            serde_json::to_value(&cfg).unwrap(),
            json!({"enabled": true, "parentKeys": ["a"], "formula": "a"})
        );
    }

    #[test]
    fn test_missing_parent_keys_stay_missing() {
        let stored = json!({"enabled": false, "formula": ""});
        let cfg: DerivedConfig = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(cfg.parent_keys, None);
        assert_eq!(serde_json::to_value(&cfg).unwrap(), stored);

        let listed = json!({"enabled": false, "parentKeys": [], "formula": ""});
        let cfg: DerivedConfig = serde_json::from_value(listed.clone()).unwrap();
        assert_eq!(cfg, DerivedConfig::disabled());
        assert_eq!(serde_json::to_value(&cfg).unwrap(), listed);
    }

    #[test]
    fn test_number_default_shapes() {
        let n: NumberDefault = serde_json::from_value(json!(42)).unwrap();
        let s: NumberDefault = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(n.to_json(), json!(42));
        assert_eq!(s.to_json(), json!("42"));
    }
}
