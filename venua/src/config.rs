//! Configuration for the venua engines.
//!
//! Configuration is merged from multiple sources with the following
//! precedence (highest to lowest):
//!
//! 1. Programmatic overrides (via [`ConfigBuilder::with_config`])
//! 2. Environment variables (`VENUA_*`)
//! 3. User config file (`~/.venua/config.yaml`)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```
//! use venua::config::{Config, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.lock_ttl_seconds, None);
//! assert_eq!(config.effective_lock_ttl().as_secs(), 10);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Engine configuration.
///
/// Every field is optional; `None` means "use the built-in default". This
/// lets the merge layers distinguish "unset" from "explicitly set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the database file. Defaults to `~/.venua`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// TTL for mutual-exclusion locks, in seconds. Defaults to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_ttl_seconds: Option<u64>,

    /// TTL for cached entities, in seconds. Defaults to 300.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_seconds: Option<u64>,

    /// Contract version stamped on new bookings. Defaults to "1.0".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_version: Option<String>,

    /// Days a pending booking may wait before the expiry sweep cancels it,
    /// when the booking carries no explicit deadline. `None` disables the
    /// implicit deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_expiry_days: Option<u32>,
}

impl Config {
    /// The lock TTL as a duration, falling back to the 10s default.
    #[must_use]
    pub fn effective_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds.unwrap_or(10))
    }

    /// The cache TTL as a duration, falling back to the 300s default.
    #[must_use]
    pub fn effective_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds.unwrap_or(300))
    }

    /// The contract version for new bookings, falling back to "1.0".
    #[must_use]
    pub fn effective_contract_version(&self) -> String {
        self.contract_version
            .clone()
            .unwrap_or_else(|| "1.0".to_string())
    }

    /// Merges `other` over `self`: set fields in `other` win.
    fn merged_with(mut self, other: Self) -> Self {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.lock_ttl_seconds.is_some() {
            self.lock_ttl_seconds = other.lock_ttl_seconds;
        }
        if other.cache_ttl_seconds.is_some() {
            self.cache_ttl_seconds = other.cache_ttl_seconds;
        }
        if other.contract_version.is_some() {
            self.contract_version = other.contract_version;
        }
        if other.pending_expiry_days.is_some() {
            self.pending_expiry_days = other.pending_expiry_days;
        }
        self
    }

    /// Validates the merged configuration.
    fn validate(&self) -> Result<()> {
        if self.lock_ttl_seconds == Some(0) {
            return Err(Error::Validation {
                field: "lock_ttl_seconds".into(),
                message: "lock TTL must be at least one second".into(),
            });
        }
        if self.cache_ttl_seconds == Some(0) {
            return Err(Error::Validation {
                field: "cache_ttl_seconds".into(),
                message: "cache TTL must be at least one second".into(),
            });
        }
        if let Some(ref version) = self.contract_version {
            if version.trim().is_empty() {
                return Err(Error::Validation {
                    field: "contract_version".into(),
                    message: "contract version must be non-empty".into(),
                });
            }
        }
        Ok(())
    }
}

/// Builder that assembles a [`Config`] from files, environment, and
/// programmatic overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    skip_files: bool,
    skip_env: bool,
    overrides: Option<Config>,
}

impl ConfigBuilder {
    /// Creates a builder that reads all sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips the user config file. Useful in tests.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Skips environment variables. Useful in tests.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Applies programmatic overrides (highest precedence).
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides = Some(config);
        self
    }

    /// Builds the merged, validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed, an environment
    /// variable carries a malformed value, or validation fails.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if !self.skip_files {
            if let Some(file_config) = load_user_config()? {
                config = config.merged_with(file_config);
            }
        }

        if !self.skip_env {
            config = config.merged_with(env_config()?);
        }

        if let Some(overrides) = self.overrides {
            config = config.merged_with(overrides);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Loads `~/.venua/config.yaml` if present.
fn load_user_config() -> Result<Option<Config>> {
    let Some(home) = home::home_dir() else {
        return Ok(None);
    };
    let path = home.join(".venua").join("config.yaml");
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(Some(config))
}

/// Reads `VENUA_*` environment overrides.
fn env_config() -> Result<Config> {
    let mut config = Config::default();

    if let Ok(dir) = std::env::var("VENUA_DATA_DIR") {
        config.data_dir = Some(PathBuf::from(dir));
    }
    if let Ok(value) = std::env::var("VENUA_LOCK_TTL_SECONDS") {
        config.lock_ttl_seconds = Some(parse_env_u64("VENUA_LOCK_TTL_SECONDS", &value)?);
    }
    if let Ok(value) = std::env::var("VENUA_CACHE_TTL_SECONDS") {
        config.cache_ttl_seconds = Some(parse_env_u64("VENUA_CACHE_TTL_SECONDS", &value)?);
    }
    if let Ok(version) = std::env::var("VENUA_CONTRACT_VERSION") {
        config.contract_version = Some(version);
    }
    if let Ok(value) = std::env::var("VENUA_PENDING_EXPIRY_DAYS") {
        let days = value.parse::<u32>().map_err(|_| Error::Validation {
            field: "VENUA_PENDING_EXPIRY_DAYS".into(),
            message: format!("expected an integer, got '{value}'"),
        })?;
        config.pending_expiry_days = Some(days);
    }

    Ok(config)
}

fn parse_env_u64(name: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|_| Error::Validation {
        field: name.into(),
        message: format!("expected an integer, got '{value}'"),
    })
}
