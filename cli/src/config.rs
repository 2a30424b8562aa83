//! CLI Configuration

use crate::output::OutputFormat;
use anyhow::{bail, Context as _};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const KEYS: [&str; 3] = ["store_path", "default_format", "log_filter"];

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub store_path: Option<PathBuf>,
    pub default_format: Option<String>,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(match key {
            "store_path" => self.store_path.as_ref().map(|p| p.display().to_string()),
            "default_format" => self.default_format.clone(),
            "log_filter" => self.log_filter.clone(),
            _ => bail!("unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        })
    }

    pub fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        match key {
            "store_path" => self.store_path = Some(PathBuf::from(value)),
            "default_format" => {
                OutputFormat::from_str(&value, true)
                    .map_err(|_| anyhow::anyhow!("unknown format: {} (expected table, json or yaml)", value))?;
                self.default_format = Some(value);
            }
            "log_filter" => self.log_filter = Some(value),
            _ => bail!("unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// Configured output format, ignoring unrecognised names.
    pub fn format(&self) -> Option<OutputFormat> {
        self.default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    }

    /// Saved-forms file: the explicit path, then the configured one, then the
    /// per-user default.
    pub fn store_path(&self, explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        if let Some(path) = explicit.or_else(|| self.store_path.clone()) {
            return Ok(path);
        }
        let base = dirs::data_dir()
            .map(|d| d.join("formsmith"))
            .or_else(|| dirs::home_dir().map(|h| h.join(".formsmith")))
            .context("cannot find a data or home directory")?;
        Ok(base.join("forms.json"))
    }

    fn config_path(profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("cannot find home directory")?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".formsmith").join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("store_path", "/tmp/forms.json".into()).unwrap();
        config.set("default_format", "yaml".into()).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.format(), Some(OutputFormat::Yaml));
        assert_eq!(loaded.get("store_path").unwrap().as_deref(), Some("/tmp/forms.json"));
        assert_eq!(loaded.get("log_filter").unwrap(), None);
    }

    #[test]
    fn test_rejects_unknown_keys_and_formats() {
        let mut config = Config::default();
        assert!(config.set("api_key", "x".into()).is_err());
        assert!(config.set("default_format", "xml".into()).is_err());
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_store_path_precedence() {
        let mut config = Config::default();
        let explicit = PathBuf::from("/explicit.json");
        config.store_path = Some(PathBuf::from("/configured.json"));

        assert_eq!(config.store_path(Some(explicit.clone())).unwrap(), explicit);
        assert_eq!(config.store_path(None).unwrap(), PathBuf::from("/configured.json"));
    }
}
