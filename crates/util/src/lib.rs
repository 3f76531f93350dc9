//! Configuration and small helpers shared by the Thematic crates.

pub mod config;
pub mod path_processing;
pub mod preferences;

pub use config::{
    CONFIG_PATH_ENV, ConfigError, THEME_ENV, ThematicConfig, ValidationError, default_config_path, load_config, load_config_from_path,
    save_config_to_path, validate_config, validate_theme_name,
};
pub use path_processing::expand_tilde;
pub use preferences::{PREFERENCES_PATH_ENV, PreferencesError, ThemePreferences};
