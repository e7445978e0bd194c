//! Settings for the `nvme-access` tool.
//!
//! The library operations themselves take everything per call; only the
//! command-line front end reads configuration. Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. `config.toml` in the platform config directory, or an explicit file
//! 3. environment variables prefixed `NVME_ACCESS_` (e.g. `NVME_ACCESS_BLOCK_SIZE`)

use crate::io::BlockSize;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "NVME_ACCESS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Block size used when a command does not pass one
    pub block_size: usize,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            block_size: BlockSize::DEFAULT.get(),
            log_filter: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl AccessConfig {
    /// Load from the default config file location (if present) and the
    /// environment.
    pub fn load() -> Result<Self> {
        let default_file = Self::default_path();
        Self::load_from(default_file.as_deref(), false)
    }

    /// Load with `path` as the config file. When `required` is false a
    /// missing file is skipped.
    pub fn load_from(path: Option<&Path>, required: bool) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("block_size", defaults.block_size as i64)?
            .set_default("log_filter", defaults.log_filter)?
            .set_default("log_format", "text")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(required));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let config: AccessConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/nvme-access/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "nvme-access").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn block_size(&self) -> Result<BlockSize> {
        BlockSize::new(self.block_size).context("Invalid block_size in configuration")
    }

    fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            bail!("block_size must be non-zero");
        }
        if self.log_filter.trim().is_empty() {
            bail!("log_filter must not be empty");
        }
        Ok(())
    }
}
