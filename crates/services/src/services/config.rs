//! Server configuration: JSON file, then defaults, then environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Points at an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "HR_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid value '{value}' for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Prefix of the alert headers, `X-{app_name}-alert`.
    pub app_name: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://hr.sqlite".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            app_name: "hrApp".to_string(),
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

impl Config {
    /// Read `path` if it exists; a missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// File named by `HR_CONFIG_PATH` (if any), then process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from_file(&PathBuf::from(path))?,
            Err(_) => Self::default(),
        };
        config.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `DATABASE_URL`, `HOST`, `PORT` and `APP_NAME` from `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: "PORT",
                    value: port.clone(),
                })?;
        }
        if let Some(app_name) = lookup("APP_NAME") {
            self.app_name = app_name;
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            warn!(
                default_page_size = self.default_page_size,
                max_page_size = self.max_page_size,
                "Page size settings out of range, falling back to defaults"
            );
            let defaults = Self::default();
            self.default_page_size = defaults.default_page_size;
            self.max_page_size = defaults.max_page_size;
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
