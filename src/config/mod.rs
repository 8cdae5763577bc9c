//! Configuration of watches.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`DYNCONF__` prefix, `__` separator)
mod retry;
pub use retry::*;


use std::env;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CONFIG_PATH_ENV;
use crate::constants::DEFAULT_LONG_POLL_WAIT_MS;
use crate::constants::ENV_PREFIX;
use crate::Error;
use crate::Result;

/// Settings shared by every watch created from one [`crate::Watcher`]
///
/// ```toml
/// long_poll_wait_ms = 60000
///
/// [retry]
/// jitter = 0.5
/// max_backoff_ms = 30000
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WatchConfig {
    /// Blocking wait the store may hold a long-poll request open for
    #[serde(default = "default_long_poll_wait_ms")]
    pub long_poll_wait_ms: u64,

    /// Backoff applied when a long-poll request fails
    #[serde(default = "BackoffPolicy::watch_default")]
    pub retry: BackoffPolicy,
}

fn default_long_poll_wait_ms() -> u64 {
    DEFAULT_LONG_POLL_WAIT_MS
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            long_poll_wait_ms: default_long_poll_wait_ms(),
            retry: BackoffPolicy::watch_default(),
        }
    }
}

impl WatchConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults
    /// 2. Configuration file from the `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with the `DYNCONF__` prefix
    ///
    /// Callers MUST call [`validate()`](Self::validate) before using the result.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        let config: Self = builder.add_source(env_source()).build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies overrides from the file at `path`, then the environment again.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        if self.long_poll_wait_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "long_poll_wait_ms must be greater than 0".to_string(),
            )));
        }
        self.retry.validate()?;
        Ok(self)
    }

    pub fn long_poll_wait(&self) -> Duration {
        Duration::from_millis(self.long_poll_wait_ms)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
