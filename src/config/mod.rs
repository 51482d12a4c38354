//! Configuration module for litgroups
//!
//! Settings are layered with the `config` crate:
//! 1. built-in defaults
//! 2. `<config dir>/litgroups/config.toml` (optional)
//! 3. environment variables prefixed `LITGROUPS__`, with `__` between
//!    sections (`LITGROUPS__AI__MODEL`, `LITGROUPS__QUERY__MAX_PAGE_SIZE`)
//!
//! The API key may also come from `DEEPSEEK_API_KEY`.

use crate::query::Limits;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `ai.api_key` is not set
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

const ENV_PREFIX: &str = "LITGROUPS";
const REDACTED: &str = "********";

/// Text generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            api_key: None,
            model: "deepseek-chat".to_string(),
            timeout_secs: 30,
            temperature: 0.1,
        }
    }
}

impl AiConfig {
    /// Configured key, or `DEEPSEEK_API_KEY` from the environment
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Query execution and validation bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub max_depth: usize,
    pub max_nodes: usize,
    pub max_set_values: usize,
    pub max_sort_keys: usize,
    pub max_text_len: usize,
    /// Longest natural-language request accepted, in characters
    pub max_input_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            default_page_size: 20,
            max_page_size: 100,
            max_depth: limits.max_depth,
            max_nodes: limits.max_nodes,
            max_set_values: limits.max_set_values,
            max_sort_keys: limits.max_sort_keys,
            max_text_len: limits.max_text_len,
            max_input_chars: 500,
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub const fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
            max_set_values: self.max_set_values,
            max_sort_keys: self.max_sort_keys,
            max_text_len: self.max_text_len,
        }
    }
}

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database directory; defaults to `<data dir>/litgroups/db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Identity used by the command line when `--owner` is not given
    pub owner: String,

    pub ai: AiConfig,
    pub query: QueryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            owner: "local".to_string(),
            ai: AiConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("litgroups").join("config.toml"))
    }

    /// Load defaults, the user config file (if any) and the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or the merged values
    /// do not deserialize.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path().ok();
        Self::load_from(path.as_deref())
    }

    /// Same as [`AppConfig::load`] with an explicit config file path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or the merged values
    /// do not deserialize.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every query fail
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.query;
        let positive = [
            ("query.default_page_size", q.default_page_size),
            ("query.max_page_size", q.max_page_size),
            ("query.max_depth", q.max_depth),
            ("query.max_nodes", q.max_nodes),
            ("query.max_set_values", q.max_set_values),
            ("query.max_text_len", q.max_text_len),
            ("query.max_input_chars", q.max_input_chars),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Message(format!("{key} must be greater than zero")));
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::Message("ai.timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    /// Save configuration to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the
    /// configuration cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Database directory, falling back to the platform data directory
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the data directory
    /// cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("litgroups").join("db"))
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))
    }

    /// Copy safe to print: the API key is masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.ai.api_key.is_some() {
            copy.ai.api_key = Some(REDACTED.to_string());
        }
        copy
    }
}
