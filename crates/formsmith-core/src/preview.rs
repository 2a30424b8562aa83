//! Interactive fill-in of a form
//!
//! A session owns one form instance: the current values, the last
//! validation message per field and the formula failures of the latest
//! resolver pass.

use crate::derive::resolve_derived_with;
use crate::domain::{Field, FormSchema, ValueSet};
use crate::error::{FormsError, FormsResult};
use crate::expr::EvalError;
use crate::validation::{validate, validate_all, ValidationReport};
use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct PreviewSession {
    fields: Vec<Field>,
    values: ValueSet,
    errors: HashMap<String, String>,
    formula_errors: Vec<(String, EvalError)>,
    clock: Option<DateTime<Utc>>,
}

impl PreviewSession {
    /// Start from each field's initial value, then derive.
    pub fn new(schema: &FormSchema) -> Self {
        Self::start(schema, None)
    }

    /// Like [`PreviewSession::new`] with `today()` pinned to `now`.
    pub fn new_at(schema: &FormSchema, now: DateTime<Utc>) -> Self {
        Self::start(schema, Some(now))
    }

    fn start(schema: &FormSchema, clock: Option<DateTime<Utc>>) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|f| (f.key.clone(), f.initial_value()))
            .collect();
        let mut session = Self {
            fields: schema.fields.clone(),
            values,
            errors: HashMap::new(),
            formula_errors: Vec::new(),
            clock,
        };
        session.resolve();
        session
    }

    /// Set one field's value, validate it and re-derive.
    ///
    /// The value is validated as given, before derivation runs.
    pub fn set_value(&mut self, key: &str, value: Json) -> FormsResult<()> {
        let field = self
            .fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| FormsError::UnknownKey(key.to_string()))?;
        match validate(field, &value) {
            Some(message) => self.errors.insert(key.to_string(), message),
            None => self.errors.remove(key),
        };
        self.values.insert(key.to_string(), value);
        self.resolve();
        Ok(())
    }

    /// Validate every field against the current values, replacing all
    /// recorded messages.
    pub fn validate_all(&mut self) -> ValidationReport {
        let report = validate_all(&self.fields, &self.values);
        self.errors = report
            .failures
            .iter()
            .map(|f| (f.key.clone(), f.message.clone()))
            .collect();
        report
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&Json> {
        self.values.get(key)
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Formulas that failed in the latest pass, by field key.
    pub fn formula_errors(&self) -> &[(String, EvalError)] {
        &self.formula_errors
    }

    fn resolve(&mut self) {
        let mut failures = Vec::new();
        self.values = resolve_derived_with(
            &self.fields,
            &self.values,
            self.clock.unwrap_or_else(Utc::now),
            |field, err| failures.push((field.key.clone(), err.clone())),
        );
        self.formula_errors = failures;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DerivedConfig, FieldKind, FieldType, ValidationRules};
    use chrono::TimeZone;
    use serde_json::json;

    fn signup() -> FormSchema {
        FormSchema::new("signup").with_fields(vec![
            Field::new("email", "Email", FieldKind::blank(FieldType::Text)).with_validations(
                ValidationRules {
                    required: Some(true),
                    email: Some(true),
                    ..ValidationRules::default()
                },
            ),
            Field::new("dob", "Birth date", FieldKind::blank(FieldType::Date)),
            Field::new("age", "Age", FieldKind::blank(FieldType::Number))
                .with_derived(DerivedConfig::formula("yearsBetween(toDate(dob), today())")),
            Field::new("terms", "Accept terms", FieldKind::blank(FieldType::Checkbox))
                .with_validations(ValidationRules::required()),
            Field::new(
                "plan",
                "Plan",
                FieldKind::Select {
                    default_value: Some("free".into()),
                    options: None,
                },
            ),
        ])
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_initial_values() {
        let session = PreviewSession::new_at(&signup(), now());
        assert_eq!(session.value("email"), Some(&json!("")));
        assert_eq!(session.value("terms"), Some(&json!(false)));
        assert_eq!(session.value("plan"), Some(&json!("free")));
        // No birth date yet, so the age resolves to 0.
        assert_eq!(session.value("age"), Some(&json!(0)));
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_set_value_validates_and_derives() {
        let mut session = PreviewSession::new_at(&signup(), now());

        session.set_value("email", json!("nope")).unwrap();
        assert_eq!(session.error("email"), Some("Enter a valid email"));

        session.set_value("email", json!("a@b.co")).unwrap();
        assert_eq!(session.error("email"), None);

        session.set_value("dob", json!("2000-01-15")).unwrap();
        assert_eq!(session.value("age"), Some(&json!(24)));
    }

    #[test]
    fn test_unknown_key() {
        let mut session = PreviewSession::new(&signup());
        assert!(matches!(
            session.set_value("ghost", json!(1)),
            Err(FormsError::UnknownKey(key)) if key == "ghost"
        ));
    }

    #[test]
    fn test_validate_all() {
        let mut session = PreviewSession::new_at(&signup(), now());
        let report = session.validate_all();
        assert!(!report.is_valid());
        assert_eq!(session.error("email"), Some("Email is required"));
        // An unticked checkbox still holds a boolean, so it is not empty.
        assert_eq!(session.error("terms"), None);

        session.set_value("terms", Json::Null).unwrap();
        assert_eq!(session.error("terms"), Some("Accept terms is required"));

        session.set_value("email", json!("a@b.co")).unwrap();
        session.set_value("terms", json!(true)).unwrap();
        assert!(session.validate_all().is_valid());
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_formula_errors_are_exposed() {
        let schema = FormSchema::new("f").with_fields(vec![
            Field::new("x", "X", FieldKind::blank(FieldType::Number))
                .with_derived(DerivedConfig::formula("missing * 2")),
        ]);
        let session = PreviewSession::new(&schema);
        assert_eq!(session.value("x"), Some(&json!("")));
        assert_eq!(
            session.formula_errors(),
            &[("x".to_string(), EvalError::UnknownIdentifier("missing".into()))]
        );
    }
}
