//! Configuration management for themed component resolution.
//! This module handles parsing, validation and environment overrides of the
//! ~/.config/thematic/config.yaml file.

mod io;
mod model;
mod validation;

pub use io::{CONFIG_PATH_ENV, THEME_ENV, default_config_path, load_config, load_config_from_path, save_config_to_path};
pub use model::{ConfigError, ThematicConfig};
pub use validation::{ValidationError, validate_config, validate_theme_name};
