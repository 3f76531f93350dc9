//! Configuration IO helpers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use dirs_next::config_dir;
use tracing::debug;

use super::model::{ConfigError, ThematicConfig};
use super::validation::validate_config;
use crate::expand_tilde;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "THEMATIC_CONFIG_PATH";

/// Environment variable overriding the active theme.
pub const THEME_ENV: &str = "THEMATIC_THEME";

/// Returns the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thematic")
        .join("config.yaml")
}

/// Loads configuration from the default path.
pub fn load_config() -> anyhow::Result<ThematicConfig> {
    let path = default_config_path();
    load_config_from_path(&path)
}

/// Loads, validates and applies environment overrides to the configuration at `path`.
///
/// A missing file yields the default configuration.
pub fn load_config_from_path(path: &Path) -> anyhow::Result<ThematicConfig> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|error| ConfigError::io(path, error))?;
        parse_config(path, &content).with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        debug!(path = %path.display(), "configuration file not found; using defaults");
        ThematicConfig::default()
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::from)?;
    Ok(config)
}

/// Saves configuration to `path`, choosing JSON or YAML by extension.
pub fn save_config_to_path(config: &ThematicConfig, path: &Path) -> anyhow::Result<()> {
    validate_config(config).map_err(ConfigError::from)?;
    if let Some(parent_directory) = path.parent() {
        fs::create_dir_all(parent_directory).map_err(|error| ConfigError::io(parent_directory, error))?;
    }

    let content = if is_json(path) {
        serde_json::to_string_pretty(config).map_err(ConfigError::from)?
    } else {
        serde_yaml::to_string(config).map_err(ConfigError::from)?
    };
    fs::write(path, content).map_err(|error| ConfigError::io(path, error))?;
    Ok(())
}

fn parse_config(path: &Path, content: &str) -> Result<ThematicConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ThematicConfig::default());
    }
    if is_json(path) {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(serde_yaml::from_str(content)?)
    }
}

fn apply_env_overrides(config: &mut ThematicConfig) {
    if let Ok(theme) = env::var(THEME_ENV) {
        let theme = theme.trim();
        if !theme.is_empty() {
            debug!(theme = %theme, "active theme overridden from environment");
            config.active_theme = Some(theme.to_string());
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use thematic_types::{FallbackPolicy, ThemeDefinition};

    #[test]
    fn default_path_honors_environment_override() {
        let override_path = "~/custom/thematic/config.yaml";
        temp_env::with_var(CONFIG_PATH_ENV, Some(override_path), || {
            assert_eq!(default_config_path(), expand_tilde(override_path));
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        let directory = tempfile::tempdir().expect("tempdir");
        temp_env::with_var_unset(THEME_ENV, || {
            let config = load_config_from_path(&directory.path().join("absent.yaml")).expect("config");
            assert_eq!(config, ThematicConfig::default());
        });
    }

    #[test]
    fn save_then_load_json_and_yaml() {
        let directory = tempfile::tempdir().expect("tempdir");
        let config = ThematicConfig {
            active_theme: Some("mantis".into()),
            fallback_policy: FallbackPolicy::Lenient,
            themes: vec![ThemeDefinition::new("dspace"), ThemeDefinition::extending("mantis", "dspace")],
        };

        temp_env::with_var_unset(THEME_ENV, || {
            for file_name in ["nested/config.yaml", "config.json"] {
                let path = directory.path().join(file_name);
                save_config_to_path(&config, &path).expect("save");
                let loaded = load_config_from_path(&path).expect("load");
                assert_eq!(loaded, config, "round trip through {}", file_name);
            }
        });
    }

    #[test]
    fn environment_overrides_active_theme() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("config.yaml");
        fs::write(&path, "activeTheme: dspace\n").expect("write");

        temp_env::with_var(THEME_ENV, Some(" custom "), || {
            let config = load_config_from_path(&path).expect("load");
            assert_eq!(config.active_theme.as_deref(), Some("custom"));
        });
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("config.yaml");
        fs::write(&path, "themes:\n  - name: child\n    extends: missing\n").expect("write");

        temp_env::with_var_unset(THEME_ENV, || {
            let error = load_config_from_path(&path).expect_err("unknown parent should fail");
            assert!(error.to_string().contains("missing"), "unexpected error: {error}");
        });
    }
}
