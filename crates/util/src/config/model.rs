//! Data models for Thematic configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thematic_types::{FallbackPolicy, ThemeDefinition, ThemeIdentifier};
use thiserror::Error;

use super::validation::ValidationError;

/// Top-level configuration file.
///
/// ```yaml
/// activeTheme: mantis
/// fallbackPolicy: strict
/// themes:
///   - name: dspace
///   - name: mantis
///     extends: dspace
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThematicConfig {
    /// Theme used when nothing else selects one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_theme: Option<String>,

    /// Behaviour when a registered override fails to load.
    #[serde(default)]
    pub fallback_policy: FallbackPolicy,

    /// Known themes and their inheritance.
    #[serde(default)]
    pub themes: Vec<ThemeDefinition>,
}

impl ThematicConfig {
    /// The configured active theme, or the "no theme" identifier.
    pub fn active_theme(&self) -> ThemeIdentifier {
        ThemeIdentifier::from(self.active_theme.clone())
    }
}

/// Errors raised while reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
