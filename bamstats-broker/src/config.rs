//! Backend connection settings.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::consts::{BACKEND_URL_ENV, DEFAULT_BACKEND_URL, DEFAULT_CONNECT_TIMEOUT_SECS};

/// Get default backend url from environment variable, falling back to a local backend
///
/// # Returns
/// - base url of the backend
pub fn get_default_backend_url() -> String {
    env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string())
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Where the backend lives and how patiently to connect to it.
///
/// Can be read from a TOML table:
///
/// ```toml
/// base_url = "https://backend.example.org"
/// connect_timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "get_default_backend_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::builder().finish()
    }
}

impl BackendConfig {
    /// Creates a new builder for constructing a [`BackendConfig`].
    pub fn builder() -> BackendConfigBuilder {
        BackendConfigBuilder::new()
    }

    /// Full URL of a backend endpoint path such as `/alignmentHeader`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Builder for a [`BackendConfig`]. Unset fields fall back to the environment and defaults.
#[derive(Default)]
pub struct BackendConfigBuilder {
    base_url: Option<String>,
    connect_timeout_secs: Option<u64>,
}

impl BackendConfigBuilder {
    /// Creates a new, empty BackendConfigBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the connection timeout in seconds.
    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = Some(seconds);
        self
    }

    /// Consumes the builder and creates a BackendConfig.
    pub fn finish(self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.unwrap_or_else(get_default_backend_url),
            connect_timeout_secs: self
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}
