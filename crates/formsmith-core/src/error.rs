//! Error types for Formsmith

use crate::expr::EvalError;
use crate::storage::StoreError;
use thiserror::Error;

/// Formsmith error type
#[derive(Error, Debug)]
pub enum FormsError {
    /// No field with this id
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// No field with this key
    #[error("no field with key: {0}")]
    UnknownKey(String),

    /// No saved form with this id
    #[error("form not found: {0}")]
    FormNotFound(String),

    /// Saving a form without fields
    #[error("add at least one field before saving")]
    EmptyForm,

    /// Formula failed to parse or evaluate
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed schema or value JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Formsmith
pub type FormsResult<T> = Result<T, FormsError>;
