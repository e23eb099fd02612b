//! Tunable limits, loaded from `.morning-call/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::call::{DEFAULT_MAX_DAYS_AHEAD, DEFAULT_MAX_MESSAGE_CHARS};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "MORNING_CALL_CONFIG";
/// Default config location relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".morning-call/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub users: UserConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: i64,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_days_ahead: default_max_days_ahead(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

impl SchedulingConfig {
    pub fn horizon(&self) -> Duration {
        Duration::days(self.max_days_ahead)
    }
}

fn default_max_days_ahead() -> i64 {
    DEFAULT_MAX_DAYS_AHEAD
}

fn default_max_message_chars() -> usize {
    DEFAULT_MAX_MESSAGE_CHARS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_min_username_chars")]
    pub min_username_chars: usize,
    #[serde(default = "default_max_username_chars")]
    pub max_username_chars: usize,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            min_username_chars: default_min_username_chars(),
            max_username_chars: default_max_username_chars(),
        }
    }
}

fn default_min_username_chars() -> usize {
    2
}

fn default_max_username_chars() -> usize {
    30
}

impl CoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduling.max_days_ahead <= 0 {
            return Err(ConfigError::Invalid("scheduling.max_days_ahead must be positive".into()));
        }
        if self.scheduling.max_message_chars == 0 {
            return Err(ConfigError::Invalid("scheduling.max_message_chars must be positive".into()));
        }
        if self.users.min_username_chars > self.users.max_username_chars {
            return Err(ConfigError::Invalid(
                "users.min_username_chars must not exceed users.max_username_chars".into(),
            ));
        }
        Ok(())
    }
}
