//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tracking::registry::{IDLE_TIMEOUT_SECS, MAX_MOVEMENT_M, MIN_MOVEMENT_M};
use crate::tracking::types::DEFAULT_CLUE_RADIUS_M;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Listener settings
    pub server: ServerSettings,
    /// Database settings
    pub storage: StorageSettings,
    /// Proximity and movement-filter settings
    pub tracking: TrackingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            tracking: TrackingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the SQLite database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.database_file)
    }
}

/// Network listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Tracking socket bind address
    pub ws_addr: String,
    /// REST API bind address
    pub http_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ws_addr: "0.0.0.0:9001".to_string(),
            http_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database file name inside the data directory
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "trailhunt.db".to_string(),
        }
    }
}

/// Proximity and movement-filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    /// Arrival radius around the mission destination in meters
    pub destination_radius_m: f64,
    /// Detection radius for appended clues that do not specify one
    pub default_clue_radius_m: f64,
    /// Movement below this many meters between fixes is ignored
    pub min_movement_m: f64,
    /// Movement above this many meters between fixes is ignored
    pub max_movement_m: f64,
    /// Idle seconds before a live session is evicted
    pub idle_timeout_secs: u64,
    /// Default search radius for nearby-clue queries in meters
    pub nearby_radius_m: f64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            destination_radius_m: 30.0,
            default_clue_radius_m: DEFAULT_CLUE_RADIUS_M,
            min_movement_m: MIN_MOVEMENT_M,
            max_movement_m: MAX_MOVEMENT_M,
            idle_timeout_secs: IDLE_TIMEOUT_SECS,
            nearby_radius_m: 5000.0,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "trailhunt", "TrailHunt")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.data_dir = PathBuf::from("/var/lib/trailhunt");
        config.server.http_addr = "127.0.0.1:9090".to_string();
        config.tracking.destination_radius_m = 25.0;

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded: AppConfig =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(loaded.server.http_addr, "127.0.0.1:9090");
        assert_eq!(loaded.tracking.destination_radius_m, 25.0);
        assert_eq!(loaded.storage.database_file, "trailhunt.db");
        // data_dir is runtime state, never written to the file.
        assert_eq!(loaded.data_dir, PathBuf::new());
    }
}
