//! Application configuration persisted as TOML under the app directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings loaded from `config.toml`, with defaults for anything absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Loop controller poll cadence in milliseconds.
    pub poll_interval_ms: u64,
    /// End bound of the playback window after a reset, in seconds.
    pub default_window_end: f32,
    /// Master output volume (0.0-1.0) for local playback.
    pub volume: f32,
    /// Widget host (hosted video backend) launch and connect settings.
    pub widget_host: WidgetHostConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            default_window_end: 10.0,
            volume: 1.0,
            widget_host: WidgetHostConfig::default(),
        }
    }
}

/// How to launch and reach the external player that renders hosted videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetHostConfig {
    /// Executable to spawn. Must speak the mpv JSON IPC protocol.
    pub command: String,
    /// Extra arguments appended to the launch command line.
    pub extra_args: Vec<String>,
    /// How many times to retry connecting to the IPC socket.
    pub connect_attempts: u32,
    /// Pause between connect attempts in milliseconds.
    pub connect_interval_ms: u64,
}

impl Default for WidgetHostConfig {
    fn default() -> Self {
        Self {
            command: "mpv".into(),
            extra_args: Vec::new(),
            connect_attempts: 50,
            connect_interval_ms: 100,
        }
    }
}

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The app directory could not be resolved or created.
    #[error(transparent)]
    AppDir(#[from] app_dirs::AppDirError),
    /// Reading the config file failed.
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing the config file failed.
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file exists but is not valid TOML for this schema.
    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Serializing the settings to TOML failed.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Absolute path of the config file inside the app directory.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration, falling back to defaults when the file is absent.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// Persist the configuration, creating the app directory if needed.
pub fn save(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;
    let data = toml::to_string_pretty(config)?;
    std::fs::write(&path, data).map_err(|source| ConfigError::Write { path, source })
}
