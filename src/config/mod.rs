//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::models::Rgb;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// League server connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL the event and availability routes hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds, 0 for none
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

/// League rules consumed by the assignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Players required per complete cell/event
    #[serde(default = "default_player_multiple")]
    pub player_multiple: usize,

    #[serde(default = "default_min_games")]
    pub min_games_total: u32,

    #[serde(default = "default_max_games")]
    pub max_games_total: u32,

    #[serde(default = "default_min_captained")]
    pub min_captained: u32,

    #[serde(default = "default_max_captained")]
    pub max_captained: u32,
}

fn default_player_multiple() -> usize {
    4
}

fn default_min_games() -> u32 {
    8
}

fn default_max_games() -> u32 {
    12
}

fn default_min_captained() -> u32 {
    1
}

fn default_max_captained() -> u32 {
    4
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            player_multiple: default_player_multiple(),
            min_games_total: default_min_games(),
            max_games_total: default_max_games(),
            min_captained: default_min_captained(),
            max_captained: default_max_captained(),
        }
    }
}

/// Colors for the pair matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Pair count of 1
    #[serde(default = "default_pair_good")]
    pub pair_good: Rgb,

    /// Pair count at the league maximum
    #[serde(default = "default_pair_bad")]
    pub pair_bad: Rgb,

    /// Players who never share a cell
    #[serde(default = "default_pair_never")]
    pub pair_never: Rgb,
}

fn default_pair_good() -> Rgb {
    Rgb::new(0x8f, 0xd1, 0x9e)
}

fn default_pair_bad() -> Rgb {
    Rgb::new(0xe0, 0x6c, 0x6c)
}

fn default_pair_never() -> Rgb {
    Rgb::new(0xee, 0xee, 0xee)
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            pair_good: default_pair_good(),
            pair_bad: default_pair_bad(),
            pair_never: default_pair_never(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub league: LeagueConfig,

    #[serde(default)]
    pub palette: PaletteConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            league: LeagueConfig::default(),
            palette: PaletteConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let league = &self.league;

        if league.player_multiple == 0 {
            return Err(ConfigError::ValidationError(
                "player_multiple must be greater than 0".to_string(),
            ));
        }

        if league.min_games_total > league.max_games_total {
            return Err(ConfigError::ValidationError(format!(
                "min_games_total ({}) exceeds max_games_total ({})",
                league.min_games_total, league.max_games_total
            )));
        }

        if league.min_captained > league.max_captained {
            return Err(ConfigError::ValidationError(format!(
                "min_captained ({}) exceeds max_captained ({})",
                league.min_captained, league.max_captained
            )));
        }

        if url::Url::parse(&self.server.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "server base_url '{}' is not a valid URL",
                self.server.base_url
            )));
        }

        Ok(())
    }
}
