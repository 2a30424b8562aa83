//! Formsmith form engine
//!
//! Schema-driven forms with per-field validation and formula-derived values.
//!
//! ## Modules
//! - [`domain`]: form schemas, typed fields and their rules
//! - [`validation`]: per-field checks producing user-facing messages
//! - [`expr`]: the formula language used by derived fields
//! - [`derive`]: one-pass recomputation of derived values
//! - [`builder`]: editing a schema field by field
//! - [`preview`]: filling in a form interactively
//! - [`storage`]: persisting saved forms
//!
//! ```
//! use formsmith_core::domain::{DerivedConfig, Field, FieldKind, FieldType, ValueSet};
//! use formsmith_core::derive::resolve_derived;
//! use serde_json::json;
//!
//! let fields = vec![
//!     Field::new("a", "A", FieldKind::blank(FieldType::Number)),
//!     Field::new("b", "B", FieldKind::blank(FieldType::Number)),
//!     Field::new("c", "C", FieldKind::blank(FieldType::Number))
//!         .with_derived(DerivedConfig::formula("a + b")),
//! ];
//! let values: ValueSet = [("a".to_string(), json!(2)), ("b".to_string(), json!(3))]
//!     .into_iter()
//!     .collect();
//! assert_eq!(resolve_derived(&fields, &values)["c"], json!(5));
//! ```

pub mod builder;
pub mod derive;
pub mod domain;
pub mod error;
pub mod expr;
pub mod preview;
pub mod storage;
pub mod validation;

pub use builder::{Direction, FormBuilder};
pub use derive::{lint_formulas, resolve_derived, resolve_derived_with, FormulaIssue};
pub use domain::{Field, FieldKind, FieldType, FormSchema, ValueSet};
pub use error::{FormsError, FormsResult};
pub use expr::{evaluate, EvalContext, EvalError, Formula, Value};
pub use preview::PreviewSession;
pub use storage::{FormLibrary, FormStore, InMemoryFormStore, JsonFileStore, StoreError};
pub use validation::{validate, validate_all, ValidationReport};
