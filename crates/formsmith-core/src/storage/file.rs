//! JSON file store

use super::{decode_forms, encode_forms, FormStore, StoreError};
use crate::domain::FormSchema;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One JSON file holding the whole collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl FormStore for JsonFileStore {
    fn load(&self) -> Vec<FormSchema> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode_forms(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved forms yet");
                Vec::new()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read saved forms");
                Vec::new()
            }
        }
    }

    fn save(&self, forms: &[FormSchema]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let raw = encode_forms(forms)?;
        fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }
}
