use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::ConfigError;

fn default_listen_addr() -> String {
    "0.0.0.0:9000".to_string()
}

fn default_spatial_addr() -> String {
    // Default OSC input port of the spatialization renderer.
    "127.0.0.1:18032".to_string()
}

fn default_playback_addr() -> String {
    "127.0.0.1:11000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the inbound OSC listener binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Address of the spatialization renderer's OSC input
    #[serde(default = "default_spatial_addr")]
    pub spatial_addr: String,

    /// Address of the playback engine's OSC input
    #[serde(default = "default_playback_addr")]
    pub playback_addr: String,

    /// Optional JSON file replacing the built-in registry tables
    #[serde(default)]
    pub registry_path: Option<PathBuf>,

    /// Optional directory for the daily-rotating file log
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Stop every player-slot clip when the router starts
    #[serde(default)]
    pub stop_players_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            spatial_addr: default_spatial_addr(),
            playback_addr: default_playback_addr(),
            registry_path: None,
            log_dir: None,
            stop_players_on_start: false,
        }
    }
}

impl Config {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).map_err(|e| ConfigError::LoadFailed {
                    path: config_path.display().to_string(),
                    source: Box::new(e),
                })?;
            let config = serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: config_path.display().to_string(),
                source: Box::new(e),
            })?;
            tracing::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
                path: config_path.display().to_string(),
                source: Box::new(e),
            })?;
        fs::write(&config_path, json).map_err(|e| ConfigError::SaveFailed {
            path: config_path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    /// Get the config file path (in the platform config directory)
    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("spat-bridge").join("config.json"))
    }

    /// Get the config file path for display purposes
    pub fn config_path_display() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}
