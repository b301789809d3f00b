//! Configuration for the sync client, loaded from TOML.
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. Default: `location-sync.toml` in the working directory, if present
//!
//! Every field has a default, so an absent file or an empty one is valid.
//! CLI flags and environment variables are layered on top by the binary.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "location-sync.toml";
pub const DEFAULT_API_URL: &str = "https://location-sync-api.kiakiraki.workers.dev";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub backfill: BackfillConfig,
}

/// `[api]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Bearer token; usually passed via LOCATION_SYNC_TOKEN instead
    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { url: default_api_url(), token: None }
    }
}

/// `[import]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportConfig {
    /// Records per POST
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Pause between chunks
    #[serde(default = "default_import_delay_secs")]
    pub delay_secs: f64,
    #[serde(default = "default_import_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_chunk_size() -> usize {
    500
}

fn default_import_delay_secs() -> f64 {
    0.5
}

fn default_import_timeout_secs() -> u64 {
    60
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            delay_secs: default_import_delay_secs(),
            timeout_secs: default_import_timeout_secs(),
        }
    }
}

impl ImportConfig {
    pub fn delay(&self) -> Duration {
        secs(self.delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[backfill]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackfillConfig {
    /// Pause between successful calls
    #[serde(default = "default_backfill_delay_secs")]
    pub delay_secs: f64,
    /// Failed calls wait `delay_secs * retry_multiplier` before retrying
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,
    #[serde(default = "default_backfill_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backfill_delay_secs() -> f64 {
    1.0
}

fn default_retry_multiplier() -> f64 {
    5.0
}

fn default_backfill_timeout_secs() -> u64 {
    120
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_backfill_delay_secs(),
            retry_multiplier: default_retry_multiplier(),
            timeout_secs: default_backfill_timeout_secs(),
        }
    }
}

impl BackfillConfig {
    pub fn delay(&self) -> Duration {
        secs(self.delay_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        secs(self.delay_secs * self.retry_multiplier)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl Config {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file that must exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load an explicit path, or the default file if it exists, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.import.chunk_size == 0 {
            bail!("import.chunk_size must be at least 1");
        }
        if self.import.delay_secs < 0.0 || self.backfill.delay_secs < 0.0 {
            bail!("delays must not be negative");
        }
        if self.backfill.retry_multiplier < 0.0 {
            bail!("backfill.retry_multiplier must not be negative");
        }
        if self.api.url.trim().is_empty() {
            bail!("api.url must not be empty");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
