//! Configuration validation rules.
//!
//! This module provides validation logic for `WorkerConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::WorkerConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn require_absolute_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field: field.into(), reason: format!("must start with '/': {value:?}") })
    }
}

impl WorkerConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - the shell and data regions would share a name
    /// - `max_body_bytes` is zero
    /// - a routing path is not absolute
    ///
    /// Returns `ConfigError::Missing` if `cache_version` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_body_bytes".into(), reason: "must be greater than 0".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        self.origin_url()?;

        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_version".into(),
                hint: "Set ROAM_SW_CACHE_VERSION, e.g. v1".into(),
            });
        }

        if self.shell_region() == self.data_region() {
            return Err(ConfigError::Invalid {
                field: "data_region_prefix".into(),
                reason: "shell and data regions must have distinct names".into(),
            });
        }

        require_absolute_path("manifest_path", &self.manifest_path)?;
        require_absolute_path("data_prefix", &self.data_prefix)?;
        require_absolute_path("sitemap_path", &self.sitemap_path)?;
        for section in &self.sitemap_sections {
            require_absolute_path("sitemap_sections", &section.path)?;
        }

        if self.shell_urls.is_empty() {
            tracing::warn!("shell_urls is empty; install will not pre-populate the shell region");
        }

        Ok(())
    }
}
