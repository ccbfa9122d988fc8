//! File-based processor configuration.
//!
//! A `sieve.config.json` (or `.yaml` / `.yml`) file can carry options, field
//! declarations and the names of custom methods:
//!
//! ```json
//! {
//!   "options": { "maxPageSize": 100, "caseSensitive": false },
//!   "fields": {
//!     "title": "title_col",
//!     "age": { "path": "age_col", "canFilter": true }
//!   },
//!   "customFilters": { "isNew": "provided at runtime" }
//! }
//! ```
//!
//! Files cannot hold code, so every custom method named in a file is
//! registered as declared-but-not-callable until a runtime handler with the
//! same name replaces it. Field value parsers can likewise only be attached
//! at runtime.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::field::{FieldConfig, FieldMap};
use crate::options::SieveOptions;

/// File names tried, in order, when no explicit path is given.
pub const CONFIG_FILE_NAMES: [&str; 3] = [
    "sieve.config.json",
    "sieve.config.yaml",
    "sieve.config.yml",
];

/// Configuration loaded from a file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SieveConfig {
    /// Processor options; missing keys take their defaults.
    pub options: SieveOptions,
    /// Field declarations keyed by public name.
    pub fields: BTreeMap<String, FieldConfig>,
    /// Custom filter names. Values only record the declared type.
    pub custom_filters: BTreeMap<String, serde_json::Value>,
    /// Custom sort names. Values only record the declared type.
    pub custom_sorts: BTreeMap<String, serde_json::Value>,
}

impl SieveConfig {
    /// Reads and parses a configuration file, picking the format from its
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match format {
            Format::Json => serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Format::Yaml => serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// The declared fields as a [`FieldMap`].
    pub fn field_map(&self) -> FieldMap {
        FieldMap::from_entries(self.fields.clone())
    }

    /// Custom filter names with the type of the value each was given.
    pub fn declared_filters(&self) -> impl Iterator<Item = (&str, &'static str)> {
        declared(&self.custom_filters)
    }

    /// Custom sort names with the type of the value each was given.
    pub fn declared_sorts(&self) -> impl Iterator<Item = (&str, &'static str)> {
        declared(&self.custom_sorts)
    }
}

enum Format {
    Json,
    Yaml,
}

fn declared(
    entries: &BTreeMap<String, serde_json::Value>,
) -> impl Iterator<Item = (&str, &'static str)> {
    entries
        .iter()
        .map(|(name, value)| (name.as_str(), json_type_name(value)))
}

// Mirrors the type names a scripting host would report for these values.
fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::String(_) => "string",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            "object"
        }
    }
}

/// Resolves which configuration file to load.
///
/// An explicit path is used as given, joined onto `cwd` when relative.
/// Otherwise the first of [`CONFIG_FILE_NAMES`] that exists in `cwd` wins.
pub fn resolve_config_path(cwd: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        });
    }

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| cwd.join(name))
        .find(|candidate| candidate.is_file())
}

/// Locates and loads a configuration file.
///
/// When nothing is found, returns an empty configuration if `optional` is
/// set and [`ConfigError::NotFound`] otherwise.
pub fn load_config(
    cwd: &Path,
    explicit: Option<&Path>,
    optional: bool,
) -> Result<SieveConfig, ConfigError> {
    match resolve_config_path(cwd, explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading sieve config");
            SieveConfig::from_path(&path)
        }
        None if optional => Ok(SieveConfig::default()),
        None => Err(ConfigError::NotFound {
            dir: cwd.to_path_buf(),
        }),
    }
}
