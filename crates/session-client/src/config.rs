//! Session configuration
//!
//! Built in code with defaults or loaded from a TOML file. Validation
//! happens in both paths: a scheme-less base URL or a zero timeout is a
//! configuration error, not a runtime surprise.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Configuration for one session client (one scope).
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Upstream API origin, e.g. `https://api.example.com/api`
    pub base_url: String,
    /// Scope identifier partitioning credentials and refresh state
    pub scope: String,
    /// Wall-clock timeout for ordinary requests
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Shorter wall-clock timeout for the refresh call
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
    /// Path of the refresh endpoint, relative to `base_url`
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Login entry point reported in the session-expired signal
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Override of the scope's default exemption allow-list
    #[serde(default)]
    pub exempt_paths: Option<Vec<String>>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_refresh_timeout_secs() -> u64 {
    10
}

fn default_refresh_path() -> String {
    "/auth/refresh".into()
}

fn default_login_path() -> String {
    "/login".into()
}

impl SessionConfig {
    /// Config with defaults for everything but the base URL and scope.
    pub fn new(base_url: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            scope: scope.into(),
            timeout_secs: default_timeout_secs(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            exempt_paths: None,
        }
    }

    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints.
    pub fn validate(&self) -> common::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.scope.is_empty() {
            return Err(common::Error::Config("scope must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if self.refresh_timeout_secs == 0 {
            return Err(common::Error::Config(
                "refresh_timeout_secs must be greater than 0".into(),
            ));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(common::Error::Config(format!(
                "refresh_path must start with '/', got: {}",
                self.refresh_path
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }
}
