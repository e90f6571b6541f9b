//! Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `cadence.toml` in the working directory (optional), or an explicit
//!    file given to the builder (required)
//! 3. Environment variables with the `CADENCE_` prefix, sections separated by
//!    `__` (a `.env` file is loaded first if present)
//! 4. Overrides set on the builder
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CADENCE_EXECUTOR__WORKER_THREADS` | Worker pool size | CPU count |
//! | `CADENCE_EXECUTOR__THREAD_NAME` | Worker thread name | `cadence-worker` |
//! | `CADENCE_EXECUTOR__SHUTDOWN_TIMEOUT_MS` | Pool shutdown grace period | 5000 |
//! | `CADENCE_LOGGING__LEVEL` | Default log filter | `info` |
//! | `CADENCE_LOGGING__JSON` | Emit JSON log lines | false |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_FILE: &str = "cadence";
const ENV_PREFIX: &str = "CADENCE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Worker pool settings for the pooled executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub worker_threads: usize,
    pub thread_name: String,
    pub shutdown_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            thread_name: "cadence-worker".to_string(),
            shutdown_timeout_ms: 5000,
        }
    }
}

impl ExecutorConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executor: ExecutorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load with no overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "executor.worker_threads must be at least 1".to_string(),
            ));
        }
        if self.executor.thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "executor.thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    worker_threads: Option<usize>,
    log_level: Option<String>,
    skip_env: bool,
}

impl ConfigBuilder {
    /// Read this file instead of `cadence.toml`; it must exist
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn worker_threads(mut self, workers: Option<usize>) -> Self {
        self.worker_threads = workers;
        self
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    /// Skip the `.env` file and `CADENCE_` variables
    pub fn without_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        if !self.skip_env {
            // A missing .env file is not an error
            let _ = dotenvy::dotenv();
        }

        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        builder = match &self.config_path {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration file");
                builder.add_source(config::File::from(path.as_path()).required(true))
            }
            None => builder.add_source(config::File::with_name(DEFAULT_FILE).required(false)),
        };

        if !self.skip_env {
            builder = builder.add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder = builder
            .set_override_option("executor.worker_threads", self.worker_threads.map(|n| n as i64))?
            .set_override_option("logging.level", self.log_level)?;

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
