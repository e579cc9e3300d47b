//! Host configuration, assembled from parsed CLI flags and their env fallbacks.

use std::time::Duration;

use board::geom::Size;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5002";
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("{0} timeout must be at least one second")]
    InvalidTimeout(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend origin without a trailing slash, e.g. `http://localhost:5002`.
    pub base_url: String,
    pub viewport: Size,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    /// Validate and normalize raw settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a base URL without an http(s) scheme, a
    /// non-positive or non-finite viewport, or a zero timeout.
    pub fn new(
        base_url: &str,
        viewport: Size,
        request_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let has_host = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
        if !has_host {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }

        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(viewport.width) || !valid(viewport.height) {
            return Err(ConfigError::InvalidViewport { width: viewport.width, height: viewport.height });
        }

        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("request"));
        }
        if connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("connect"));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            viewport,
            request_timeout: Duration::from_secs(request_timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            viewport: Size::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
