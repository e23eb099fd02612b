use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use morning_call::config::DEFAULT_CONFIG_PATH;
use morning_call::CoreConfig;

/// Configuration resolved for one CLI invocation
pub struct CliContext {
    /// Path that was consulted for the config file
    pub config_path: PathBuf,
    /// Whether the config came from that file rather than defaults
    pub from_file: bool,
    pub config: CoreConfig,
}

impl CliContext {
    /// Loads the config from `path`, or from `.morning-call/config.toml` when none is given
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&config_path)
    }

    pub fn from_path(config_path: &Path) -> Result<Self> {
        let from_file = config_path.exists();
        let config = CoreConfig::load(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        Ok(Self {
            config_path: config_path.to_path_buf(),
            from_file,
            config,
        })
    }
}
