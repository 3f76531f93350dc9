//! Persisted theme selection.
//!
//! Remembers the theme chosen with `thematic prefer`. The JSON file lives in
//! the standard configuration directory (`~/.config/thematic/preferences.json`
//! on most platforms) unless `THEMATIC_PREFERENCES_PATH` points elsewhere.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::expand_tilde;

pub const PREFERENCES_PATH_ENV: &str = "THEMATIC_PREFERENCES_PATH";

pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("preferences I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PreferencesError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preferred_theme: Option<String>,
}

/// Theme preference store. Without a backing file it only lives in memory.
#[derive(Debug, Default)]
pub struct ThemePreferences {
    file: Option<PathBuf>,
    stored: Mutex<StoredPreferences>,
}

impl ThemePreferences {
    /// Open the store at `THEMATIC_PREFERENCES_PATH` or the config directory.
    pub fn open_default() -> Result<Self, PreferencesError> {
        Self::open(default_preferences_path())
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let stored = read_stored(&path)?;
        Ok(Self {
            file: Some(path),
            stored: Mutex::new(stored),
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, `None` for an in-memory store.
    pub fn location(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn preferred_theme(&self) -> Option<String> {
        self.stored.lock().expect("preferences lock poisoned").preferred_theme.clone()
    }

    /// Remember `theme`, or forget the preference with `None`.
    pub fn set_preferred_theme(&self, theme: Option<String>) -> Result<(), PreferencesError> {
        let mut stored = self.stored.lock().expect("preferences lock poisoned");
        let previous = std::mem::replace(&mut stored.preferred_theme, theme);
        if let Some(path) = &self.file
            && let Err(error) = write_stored(path, &stored)
        {
            stored.preferred_theme = previous;
            return Err(error);
        }
        Ok(())
    }
}

fn default_preferences_path() -> PathBuf {
    match env::var(PREFERENCES_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => expand_tilde(path.trim()),
        _ => config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("thematic")
            .join(PREFERENCES_FILE_NAME),
    }
}

fn read_stored(path: &Path) -> Result<StoredPreferences, PreferencesError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no preferences file yet");
            return Ok(StoredPreferences::default());
        }
        Err(error) => return Err(PreferencesError::io(path, error)),
    };
    Ok(serde_json::from_str(&content).unwrap_or_else(|error| {
        warn!(path = %path.display(), error = %error, "ignoring unreadable preferences file");
        StoredPreferences::default()
    }))
}

/// Write through a sibling temp file so a crash never leaves a torn file.
fn write_stored(path: &Path, stored: &StoredPreferences) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| PreferencesError::io(parent, error))?;
    }
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, serde_json::to_vec_pretty(stored)?).map_err(|error| PreferencesError::io(&staging, error))?;
    fs::rename(&staging, path).map_err(|error| PreferencesError::io(path, error))
}
