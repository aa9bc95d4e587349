//! Configuration management.
//!
//! Settings come from the environment (prefix `BACKUP`), optionally layered
//! over a configuration file. The four global resource settings keep the flat
//! names operators already use (`BACKUP_GLOBAL_CPU_LIMIT` and friends); nested
//! sections use `__` (`BACKUP_LOGGING__LEVEL`).

use std::path::Path;

use serde::Deserialize;

use crate::error::{CadenceError, ErrorCode, Result};
use crate::resources::GlobalDefaults;
use crate::telemetry::LoggingConfig;

const ENV_PREFIX: &str = "BACKUP";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Default CPU limit applied when neither the job nor the template sets one
    #[serde(default)]
    pub global_cpu_limit: Option<String>,

    /// Default CPU request
    #[serde(default)]
    pub global_cpu_request: Option<String>,

    /// Default memory limit
    #[serde(default)]
    pub global_memory_limit: Option<String>,

    /// Default memory request
    #[serde(default)]
    pub global_memory_request: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The raw, unvalidated global resource settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalResourceConfig {
    pub cpu_limit: Option<String>,
    pub cpu_request: Option<String>,
    pub memory_limit: Option<String>,
    pub memory_request: Option<String>,
}

/// Read a `.env` file from the working directory, if there is one.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        Self::build(None, None)
    }

    /// Load from a specific file path, with the environment layered on top.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = config::File::from(path.as_ref());
        Self::build(Some(file), None)
    }

    /// Parse a TOML document, ignoring the process environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from an explicit set of environment variables instead of the
    /// process environment.
    pub fn from_env_map<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::build(None, Some(map))
    }

    fn build(
        file: Option<config::File<config::FileSourceFile, config::FileFormat>>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .source(env);

        let config = builder.add_source(environment).build()?;
        Ok(config.try_deserialize()?)
    }

    /// The global resource settings as read, before validation.
    pub fn global_resources(&self) -> GlobalResourceConfig {
        GlobalResourceConfig {
            cpu_limit: self.global_cpu_limit.clone(),
            cpu_request: self.global_cpu_request.clone(),
            memory_limit: self.global_memory_limit.clone(),
            memory_request: self.global_memory_request.clone(),
        }
    }

    /// Validate everything that must hold before the process starts serving.
    ///
    /// Returns the parsed global defaults; the first malformed setting aborts.
    pub fn validate_syntax(&self) -> Result<GlobalDefaults> {
        self.logging.env_filter().map_err(|e| {
            CadenceError::with_internal(
                ErrorCode::InvalidConfiguration,
                format!("invalid log level '{}'", self.logging.level),
                e.to_string(),
            )
        })?;

        GlobalDefaults::from_config(&self.global_resources())
    }
}
