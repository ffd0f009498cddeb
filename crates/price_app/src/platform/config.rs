use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use price_engine::FetchSettings;
use price_logging::{price_debug, price_info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "./price_watch.ron";
pub const API_KEY_ENV: &str = "COINAPI_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Endpoint and transport limits, as stored in `price_watch.ron`.
///
/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub quote: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            base_url: settings.base_url,
            api_key: settings.api_key,
            quote: settings.quote,
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            max_bytes: settings.max_bytes,
        }
    }
}

impl AppConfig {
    /// Replaces the file's key with a non-blank override.
    pub fn apply_api_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            price_debug!("Using API key from {}", API_KEY_ENV);
            self.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.quote.trim().is_empty() {
            return Err(ConfigError::Invalid("quote is empty".into()));
        }
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".into()));
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.base_url.trim().to_string(),
            api_key: self.api_key.clone(),
            quote: self.quote.trim().to_ascii_uppercase(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_bytes: self.max_bytes,
        }
    }
}

/// Loads the configuration.
///
/// An explicit path must exist. Without one, `./price_watch.ron` is used when
/// present and the defaults otherwise. `COINAPI_KEY` wins over the file.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_file(default_path)?
            } else {
                AppConfig::default()
            }
        }
    };
    config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
    config.validate()?;
    Ok(config)
}

pub fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    price_info!("Loaded configuration from {:?}", path);
    Ok(config)
}
