//! In-memory form store

use super::{decode_forms, encode_forms, FormStore, StoreError};
use crate::domain::FormSchema;
use parking_lot::RwLock;

/// Raw string slot held in memory (for testing and development).
///
/// Stores the encoded text rather than the schemas so corrupt data can be
/// injected and read back the same way a file would be.
#[derive(Debug, Default)]
pub struct InMemoryFormStore {
    slot: RwLock<Option<String>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
        }
    }

    /// Current slot contents.
    pub fn raw(&self) -> Option<String> {
        self.slot.read().clone()
    }
}

impl FormStore for InMemoryFormStore {
    fn load(&self) -> Vec<FormSchema> {
        self.slot.read().as_deref().map(decode_forms).unwrap_or_default()
    }

    fn save(&self, forms: &[FormSchema]) -> Result<(), StoreError> {
        let raw = encode_forms(forms)?;
        *self.slot.write() = Some(raw);
        Ok(())
    }
}
