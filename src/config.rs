//! Loading trainer [`Settings`] from TOML or JSON files.
//!
//! The file uses the same field names as the persisted settings object
//! (`digits`, `actions`, `toggles`, `operations`, `unknownPosition`, ...).

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::training_engine::models::Settings;

/// Env var holding the path of a settings file.
pub const SETTINGS_PATH_ENV: &str = "EQUATION_SETTINGS_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse TOML settings {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("failed to parse JSON settings {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

/// Read settings from `path`. `.toml` files are parsed as TOML, anything
/// else as JSON.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&text).map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })
    } else {
        serde_json::from_str(&text).map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
    }
}

/// Load settings from the file named by `EQUATION_SETTINGS_PATH`.
/// Returns `None` when the variable is unset or the file is unusable.
pub fn load_settings_from_env() -> Option<Settings> {
    let path = std::env::var(SETTINGS_PATH_ENV).ok()?;
    match load_settings(&path) {
        Ok(settings) => {
            info!(target: "equation_drill_gen", %path, "loaded settings");
            Some(settings)
        }
        Err(e) => {
            error!(target: "equation_drill_gen", %path, error = %e, "failed to load settings");
            None
        }
    }
}
