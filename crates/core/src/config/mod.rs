//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (THISDAY_MEDIA_*)
//! 2. TOML config file (if THISDAY_MEDIA_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The cache prefix, generation version and entry budget are not
//! configurable. They are constants in [`crate::cache::policy`].

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (THISDAY_MEDIA_*)
/// 2. TOML config file (if THISDAY_MEDIA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite media cache database.
    ///
    /// Set via THISDAY_MEDIA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL that relative media URLs (`/api/media/...`) resolve against.
    ///
    /// Set via THISDAY_MEDIA_ORIGIN environment variable.
    #[serde(default)]
    pub origin: Option<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via THISDAY_MEDIA_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via THISDAY_MEDIA_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Optional HTTP request timeout in milliseconds. Unset means no timeout.
    ///
    /// Set via THISDAY_MEDIA_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Whether the persistent cache capability is offered at all.
    ///
    /// Set via THISDAY_MEDIA_CACHE_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Whether the interception layer is installed.
    ///
    /// Set via THISDAY_MEDIA_INTERCEPT_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub intercept_enabled: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./thisday-media-cache.sqlite")
}

fn default_user_agent() -> String {
    "thisday-media/0.1".into()
}

fn default_max_bytes() -> usize {
    268_435_456 // 256MB
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
            cache_enabled: true,
            intercept_enabled: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `THISDAY_MEDIA_`
    /// 2. TOML file from `THISDAY_MEDIA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("THISDAY_MEDIA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("THISDAY_MEDIA_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed origin, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Option<url::Url>, ConfigError> {
        let Some(origin) = self.origin.as_deref() else {
            return Ok(None);
        };

        let parsed = url::Url::parse(origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;

        match parsed.scheme() {
            "http" | "https" => Ok(Some(parsed)),
            scheme => Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }
}
