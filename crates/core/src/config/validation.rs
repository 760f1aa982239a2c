//! Checks applied to a loaded [`AppConfig`].

use std::ops::RangeInclusive;

use crate::config::AppConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid { field: field.to_string(), reason: reason.into() }
    }
}

const MAX_BYTES_RANGE: RangeInclusive<usize> = 1..=1024 * 1024 * 1024;
const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 100..=600_000;

impl AppConfig {
    /// Reject values the fetch path or the store cannot work with.
    ///
    /// `max_bytes` must be within 1 byte..=1 GiB, `timeout_ms` (when set)
    /// within 100ms..=10min, `user_agent` non-empty and `origin` (when set)
    /// an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MAX_BYTES_RANGE.contains(&self.max_bytes) {
            return Err(ConfigError::invalid(
                "max_bytes",
                format!("must be between {} and {}", MAX_BYTES_RANGE.start(), MAX_BYTES_RANGE.end()),
            ));
        }

        if let Some(timeout_ms) = self.timeout_ms
            && !TIMEOUT_MS_RANGE.contains(&timeout_ms)
        {
            return Err(ConfigError::invalid(
                "timeout_ms",
                format!("must be between {}ms and {}ms", TIMEOUT_MS_RANGE.start(), TIMEOUT_MS_RANGE.end()),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        self.origin_url()?;

        if self.intercept_enabled && !self.cache_enabled {
            tracing::warn!("intercept_enabled has no effect while cache_enabled is false");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(config: AppConfig) -> String {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_max_bytes_bounds() {
        assert_eq!(rejected_field(AppConfig { max_bytes: 0, ..Default::default() }), "max_bytes");
        assert_eq!(
            rejected_field(AppConfig { max_bytes: MAX_BYTES_RANGE.end() + 1, ..Default::default() }),
            "max_bytes"
        );
        assert!(AppConfig { max_bytes: *MAX_BYTES_RANGE.end(), ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        assert_eq!(rejected_field(AppConfig { timeout_ms: Some(99), ..Default::default() }), "timeout_ms");
        assert_eq!(rejected_field(AppConfig { timeout_ms: Some(600_001), ..Default::default() }), "timeout_ms");
        assert!(AppConfig { timeout_ms: Some(100), ..Default::default() }.validate().is_ok());
        assert!(AppConfig { timeout_ms: None, ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_blank_user_agent() {
        assert_eq!(rejected_field(AppConfig { user_agent: "  ".into(), ..Default::default() }), "user_agent");
    }

    #[test]
    fn test_origin() {
        assert_eq!(rejected_field(AppConfig { origin: Some("not a url".into()), ..Default::default() }), "origin");
        assert_eq!(
            rejected_field(AppConfig { origin: Some("ftp://thisday.example".into()), ..Default::default() }),
            "origin"
        );
        assert!(
            AppConfig { origin: Some("https://thisday.example".into()), ..Default::default() }
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_intercept_without_cache_is_allowed() {
        let config = AppConfig { cache_enabled: false, intercept_enabled: true, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
