//! Runtime settings for the BCCh CLI
//!
//! Settings come from an optional TOML file (`--config`, or `config.toml` in
//! the XDG config directory when present). Every field has a default, so an
//! empty or missing file yields a working configuration.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::credentials::DEFAULT_CREDENTIALS_FILE;
use crate::data::BCCH_BASE_URL;
use crate::fetch::DEFAULT_CONCURRENCY;

/// HTTP request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Cache TTL in seconds (24 hours)
const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Errors that can occur when loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `Settings`
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Endpoint of the BCCh REST web service
    pub base_url: String,
    /// Per-request network timeout
    pub request_timeout_secs: u64,
    /// Cache TTL, also the reap period
    pub cache_ttl_secs: u64,
    /// Default concurrency for batch fetches; non-positive means 3
    pub max_concurrency: i64,
    /// Location of the credentials file
    pub credentials_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: BCCH_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_concurrency: DEFAULT_CONCURRENCY as i64,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the default location if it exists
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_path(path)?,
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => Self::from_path(&path)?,
                None => Self::default(),
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a TOML file without validating them
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_ttl_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.credentials_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "credentials_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// `config.toml` inside the XDG config directory (`~/.config/bcch/` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "bcch")?;
    Some(project_dirs.config_dir().join("config.toml"))
}
