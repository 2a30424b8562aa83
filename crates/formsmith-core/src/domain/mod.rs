//! Formsmith domain model
//!
//! - **Value Objects**: FieldType, ValidationRules, FieldOption, DerivedConfig
//! - **Aggregates**: FormSchema with its ordered Field entities
//!
//! The core never mutates a field; fields are inputs to validation and
//! derivation, edited only through the builder.

pub mod value_objects;
pub mod aggregates;

pub use value_objects::*;
pub use aggregates::*;

use std::collections::HashMap;

/// Live values of one form instance, keyed by field key.
pub type ValueSet = HashMap<String, serde_json::Value>;
