//! Configuration validation.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::model::ThematicConfig;

static THEME_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("theme name regex should compile"));

/// Validate the entire configuration.
///
/// Inheritance cycles are not checked here; the theme catalog rejects them
/// when it is built.
pub fn validate_config(config: &ThematicConfig) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for theme in &config.themes {
        validate_theme_name(&theme.name)?;
        if !seen.insert(theme.name.as_str()) {
            return Err(ValidationError::DuplicateTheme { name: theme.name.clone() });
        }
    }

    for theme in &config.themes {
        if let Some(parent) = theme.extends.as_deref() {
            if parent == theme.name {
                return Err(ValidationError::SelfExtendingTheme { name: theme.name.clone() });
            }
            if !seen.contains(parent) {
                return Err(ValidationError::UnknownParentTheme {
                    name: theme.name.clone(),
                    parent: parent.to_string(),
                });
            }
        }
        debug!(theme = %theme.name, "validated theme definition");
    }

    if let Some(active) = config.active_theme.as_deref() {
        validate_theme_name(active)?;
    }
    Ok(())
}

/// Validate a theme name.
pub fn validate_theme_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidThemeName {
            name: name.to_string(),
            reason: "Theme name cannot be empty".to_string(),
        });
    }

    if !THEME_NAME_REGEX.is_match(name) {
        return Err(ValidationError::InvalidThemeName {
            name: name.to_string(),
            reason: "Theme name must start with a letter or digit and contain only letters, digits, dots, underscores, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

/// Validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid theme name '{name}': {reason}")]
    InvalidThemeName { name: String, reason: String },

    #[error("Theme '{name}' is defined more than once")]
    DuplicateTheme { name: String },

    #[error("Theme '{name}' extends unknown theme '{parent}'")]
    UnknownParentTheme { name: String, parent: String },

    #[error("Theme '{name}' cannot extend itself")]
    SelfExtendingTheme { name: String },
}
