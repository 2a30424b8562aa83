//! CLI Commands

pub mod config;
pub mod derive;
pub mod eval;
pub mod forms;
pub mod lint;
pub mod validate;

use crate::output::OutputFormat;
use anyhow::Context as _;
use formsmith_core::domain::{FormSchema, ValueSet};
use formsmith_core::storage::{FormLibrary, JsonFileStore};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings shared by every command.
pub struct Context {
    pub store_path: PathBuf,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(store_path: PathBuf, format: OutputFormat) -> Self {
        Self { store_path, format }
    }

    pub fn library(&self) -> FormLibrary<JsonFileStore> {
        tracing::debug!(path = %self.store_path.display(), "opening form library");
        FormLibrary::open(JsonFileStore::new(&self.store_path))
    }

    /// A form given either as a schema file or as a saved form id.
    pub fn load_form(&self, reference: &str) -> anyhow::Result<FormSchema> {
        let path = Path::new(reference);
        if path.is_file() {
            return read_document(path);
        }
        self.library()
            .get(reference)
            .cloned()
            .with_context(|| format!("no saved form with id {} and no such file", reference))
    }
}

/// Parse a JSON or YAML file, chosen by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

pub fn read_values(path: &Path) -> anyhow::Result<ValueSet> {
    read_document(path)
}

/// Cell text for a JSON value: strings unquoted, everything else as JSON.
pub fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
