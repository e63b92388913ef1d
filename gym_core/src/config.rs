//! Configuration file support for gymlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gymlog/config.toml`.

use crate::auth::{
    DEFAULT_MIN_PASSWORD_LENGTH, DEFAULT_SESSION_EXPIRY_DAYS, MAX_SESSION_EXPIRY_DAYS,
};
use crate::progress::DEFAULT_HISTORY_LIMIT;
use crate::stats::{DEFAULT_RECENT_ACTIVITY, DEFAULT_TOP_FREQUENT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Password gate configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_expiry_days")]
    pub session_expiry_days: i64,

    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_expiry_days: default_session_expiry_days(),
            min_password_length: default_min_password_length(),
        }
    }
}

/// Dashboard and listing sizes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_top_frequent")]
    pub top_frequent: usize,

    #[serde(default = "default_recent_activity")]
    pub recent_activity: usize,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_frequent: default_top_frequent(),
            recent_activity: default_recent_activity(),
            history_limit: default_history_limit(),
            weight_unit: default_weight_unit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("gymlog")
}

fn default_session_expiry_days() -> i64 {
    DEFAULT_SESSION_EXPIRY_DAYS
}

fn default_min_password_length() -> usize {
    DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_top_frequent() -> usize {
    DEFAULT_TOP_FREQUENT
}

fn default_recent_activity() -> usize {
    DEFAULT_RECENT_ACTIVITY
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_weight_unit() -> String {
    "lbs".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("gymlog").join("config.toml")
    }

    /// Reject values that would make the gate or views unusable
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_EXPIRY_DAYS).contains(&self.auth.session_expiry_days) {
            return Err(Error::Config(format!(
                "session_expiry_days must be between 1 and {}, got {}",
                MAX_SESSION_EXPIRY_DAYS, self.auth.session_expiry_days
            )));
        }
        if self.auth.min_password_length == 0 {
            return Err(Error::Config("min_password_length must be at least 1".into()));
        }
        Ok(())
    }
}
