//! Persistence of saved form schemas
//!
//! The whole collection lives in one slot as a JSON array of schemas. Stores
//! implement [`FormStore`]; [`FormLibrary`] keeps the working copy and writes
//! it back after every mutation.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryFormStore;

use crate::domain::FormSchema;
use crate::error::{FormsError, FormsResult};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode forms: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Slot holding the saved-forms collection.
pub trait FormStore: Send + Sync {
    /// Read the collection. Missing or malformed data yields an empty list.
    fn load(&self) -> Vec<FormSchema>;

    /// Replace the collection.
    fn save(&self, forms: &[FormSchema]) -> Result<(), StoreError>;
}

/// Decode a stored collection, recovering from corruption with an empty one.
pub fn decode_forms(raw: &str) -> Vec<FormSchema> {
    match serde_json::from_str::<Vec<FormSchema>>(raw) {
        Ok(forms) => forms,
        Err(err) => {
            warn!(error = %err, "discarding unreadable saved forms");
            Vec::new()
        }
    }
}

pub fn encode_forms(forms: &[FormSchema]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(forms)?)
}

/// Saved forms, most recently added first.
pub struct FormLibrary<S: FormStore> {
    store: S,
    forms: Vec<FormSchema>,
}

impl<S: FormStore> FormLibrary<S> {
    /// Load the collection from `store`.
    pub fn open(store: S) -> Self {
        let forms = store.load();
        Self { store, forms }
    }

    pub fn forms(&self) -> &[FormSchema] {
        &self.forms
    }

    pub fn get(&self, id: &str) -> Option<&FormSchema> {
        self.forms.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the form with the same id in place, or add it at the front.
    pub fn save_form(&mut self, schema: FormSchema) -> FormsResult<()> {
        let mut next = self.forms.clone();
        let id = schema.id.clone();
        let updated = match next.iter_mut().find(|f| f.id == schema.id) {
            Some(existing) => {
                *existing = schema;
                true
            }
            None => {
                next.insert(0, schema);
                false
            }
        };
        self.commit(next)?;
        if updated {
            info!(form = %id, "form updated");
        } else {
            info!(form = %id, "form saved");
        }
        Ok(())
    }

    pub fn delete_form(&mut self, id: &str) -> FormsResult<FormSchema> {
        let index = self
            .forms
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FormsError::FormNotFound(id.to_string()))?;
        let mut next = self.forms.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        info!(form = %id, "form deleted");
        Ok(removed)
    }

    pub fn clear_all(&mut self) -> FormsResult<()> {
        let count = self.forms.len();
        self.commit(Vec::new())?;
        info!(count, "all forms cleared");
        Ok(())
    }

    // The working copy only changes once the store has accepted `next`.
    fn commit(&mut self, next: Vec<FormSchema>) -> FormsResult<()> {
        self.store.save(&next)?;
        self.forms = next;
        Ok(())
    }
}
