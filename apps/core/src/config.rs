use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hotkey::{parse_chord, DEFAULT_SEARCH_CHORD};
use crate::preferences::DEFAULT_PREFERENCES_KEY;

pub const APP_DIR_NAME: &str = "learnhub";
pub const DATA_DIR_ENV: &str = "LEARNHUB_DATA_DIR";
pub const MIN_DEBOUNCE_MS: u64 = 150;
pub const MAX_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_dir: PathBuf,
    pub preferences_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_db_path: Option<PathBuf>,
    pub shortcut: String,
    pub debounce_ms: u64,
    pub log_level: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            storage_dir: base.join("storage"),
            preferences_key: DEFAULT_PREFERENCES_KEY.to_string(),
            catalog_path: None,
            catalog_db_path: None,
            shortcut: DEFAULT_SEARCH_CHORD.to_string(),
            debounce_ms: 200,
            log_level: "info".to_string(),
            config_path: base.join("config.toml"),
        }
    }
}

/// Per-user data directory, overridable through `LEARNHUB_DATA_DIR`.
pub fn stable_app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(dir);
    }
    platform_data_root().join(APP_DIR_NAME)
}

fn platform_data_root() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata);
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|value| !value.is_empty()) {
            return PathBuf::from(xdg);
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".local").join("share");
        }
    }

    std::env::temp_dir()
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.storage_dir.as_os_str().is_empty() {
        return Err("storage_dir is required".into());
    }

    if cfg.preferences_key.trim().is_empty() {
        return Err("preferences_key is required".into());
    }

    if !(MIN_DEBOUNCE_MS..=MAX_DEBOUNCE_MS).contains(&cfg.debounce_ms) {
        return Err(format!(
            "debounce_ms must be between {MIN_DEBOUNCE_MS} and {MAX_DEBOUNCE_MS}"
        ));
    }

    parse_chord(&cfg.shortcut).map_err(|error| format!("shortcut: {error}"))?;

    if !matches!(
        cfg.log_level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(format!("unsupported log_level '{}'", cfg.log_level));
    }

    Ok(())
}

/// Reads `path` (or the default location). A missing file yields defaults
/// that remember where they should be saved.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut config = match std::fs::read_to_string(&config_path) {
        Ok(text) => toml::from_str::<Config>(&text).map_err(|error| ConfigError::Parse {
            path: config_path.clone(),
            message: error.to_string(),
        })?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };

    config.config_path = config_path;
    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg).map_err(ConfigError::Invalid)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, text).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })
}
