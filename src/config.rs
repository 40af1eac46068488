//! Adapter configuration documents.
//!
//! Each corpus source reads its settings from a small TOML document. Sources
//! declare their own required keys and validate them eagerly at construction,
//! so a missing key aborts the job before any audio is touched. Keys a source
//! does not know about are ignored.

use crate::error::{Result, ScribeError};
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed configuration document with typed, fail-fast accessors.
#[derive(Debug, Clone)]
pub struct ConfigDoc {
    path: PathBuf,
    table: toml::Table,
}

impl ConfigDoc {
    /// Load and parse a TOML configuration document.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ScribeError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let table: toml::Table =
            toml::from_str(&contents).map_err(|e| ScribeError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(path = %path.display(), keys = table.len(), "parsed source config");
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    /// The document this config was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A required string value.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        let value = self.table.get(key).ok_or_else(|| self.missing(key))?;
        value.as_str().ok_or_else(|| invalid(key, "a string", value))
    }

    /// A required path value.
    pub fn require_path(&self, key: &str) -> Result<PathBuf> {
        Ok(PathBuf::from(self.require_str(key)?))
    }

    /// An optional string value.
    pub fn optional_str(&self, key: &str) -> Result<Option<&str>> {
        match self.table.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| invalid(key, "a string", value)),
        }
    }

    /// An optional boolean, falling back to `default` when the key is absent.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.table.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| invalid(key, "a boolean", value)),
        }
    }

    fn missing(&self, key: &str) -> ScribeError {
        ScribeError::ConfigMissingKey {
            key: key.to_string(),
            path: self.path.display().to_string(),
        }
    }
}

fn invalid(key: &str, expected: &str, value: &toml::Value) -> ScribeError {
    ScribeError::ConfigInvalidValue {
        key: key.to_string(),
        message: format!("expected {expected}, got {value}"),
    }
}
