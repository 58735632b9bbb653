//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `--config <path>`, or `review-relay.toml` in the working directory
//! 4. `~/.config/review-relay/config.toml` (global defaults)
//! 5. Built-in defaults
//!
//! The upstream API key itself is never part of the config. Only the name
//! of the variable holding it is, and the relay reads that variable on
//! every request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants;
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

/// Inbound HTTP surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. `0.0.0.0:7076`.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: constants::DEFAULT_LISTEN.to_string(),
        }
    }
}

/// Completion API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            timeout_secs: constants::DEFAULT_UPSTREAM_TIMEOUT.as_secs(),
            api_key_env: constants::DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Full chat-completions URL.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            constants::CHAT_COMPLETIONS_PATH
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: constants::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// An explicit `path` must exist; the implicit local file is optional.
    pub fn load(path: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: explicit or working-directory config
        match path {
            Some(explicit) => config.merge(Self::load_file(explicit)?),
            None => {
                let local_path = Path::new(constants::CONFIG_FILENAME);
                if local_path.exists() {
                    config.merge(Self::load_file(local_path)?);
                }
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env)?;

        Ok(config)
    }

    /// Load a config from a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_server = ServerConfig::default();
        if other.server.listen != default_server.listen {
            self.server.listen = other.server.listen;
        }

        let default_upstream = UpstreamConfig::default();
        if other.upstream.base_url != default_upstream.base_url {
            self.upstream.base_url = other.upstream.base_url;
        }
        if other.upstream.timeout_secs != default_upstream.timeout_secs {
            self.upstream.timeout_secs = other.upstream.timeout_secs;
        }
        if other.upstream.api_key_env != default_upstream.api_key_env {
            self.upstream.api_key_env = other.upstream.api_key_env;
        }

        if other.logging.level != LoggingConfig::default().level {
            self.logging.level = other.logging.level;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) -> Result<(), ConfigError> {
        if let Ok(val) = env.var(constants::ENV_LISTEN) {
            self.server.listen = val;
        }
        if let Ok(val) = env.var(constants::ENV_BASE_URL) {
            self.upstream.base_url = val;
        }
        if let Ok(val) = env.var(constants::ENV_TIMEOUT_SECS) {
            self.upstream.timeout_secs = match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: constants::ENV_TIMEOUT_SECS,
                        value: val,
                    });
                }
            };
        }
        if let Ok(val) = env.var(constants::ENV_API_KEY_ENV) {
            if val.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    name: constants::ENV_API_KEY_ENV,
                    value: val,
                });
            }
            self.upstream.api_key_env = val;
        }
        if let Ok(val) = env.var(constants::ENV_LOG) {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Apply CLI flag overrides (highest priority).
    pub fn apply_cli(&mut self, listen: Option<String>, log_level: Option<String>) {
        if let Some(listen) = listen {
            self.server.listen = listen;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
    }
}
