//! Analysis configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default key of the project element for bytecode-only packages.
pub const DEFAULT_PROJECT_KEY: &str = "project";

/// Options recognised by an analysis run.
///
/// ```
/// use squid_core::SquidConfig;
///
/// let config = SquidConfig::from_json_str(r#"{ "fields_to_exclude_from_lcom4": ["LOG"] }"#)
///     .unwrap();
/// assert!(config.is_excluded_from_lcom4("LOG"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquidConfig {
    /// Key of the project element that owns bytecode-only packages when the
    /// source scan reported no project.
    pub project_key: String,

    /// Field names left out of the LCOM4 graph (loggers, serial ids...).
    pub fields_to_exclude_from_lcom4: BTreeSet<String>,
}

impl Default for SquidConfig {
    fn default() -> Self {
        Self {
            project_key: DEFAULT_PROJECT_KEY.to_string(),
            fields_to_exclude_from_lcom4: BTreeSet::new(),
        }
    }
}

impl SquidConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing options take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        debug!(
            "Loaded config from {} ({} LCOM4 exclusions)",
            path.display(),
            config.fields_to_exclude_from_lcom4.len()
        );
        Ok(config)
    }

    pub fn with_project_key(mut self, key: impl Into<String>) -> Self {
        self.project_key = key.into();
        self
    }

    pub fn with_lcom4_exclusions<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_exclude_from_lcom4
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded_from_lcom4(&self, field_name: &str) -> bool {
        self.fields_to_exclude_from_lcom4.contains(field_name)
    }
}
