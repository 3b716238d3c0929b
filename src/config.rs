use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default confirmation-poll cadence: one probe per second, thirty probes.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Client configuration. Built directly or read from `EVOTING_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    service_url: String,
    poll_interval_ms: u64,
    poll_max_attempts: u32,
    http_timeout_ms: u64,
}

impl Config {
    /// A configuration with default polling cadence and timeouts.
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }

    /// Read the configuration from the environment. `EVOTING_SERVICE_URL`
    /// must be set; the rest fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let service_url = env::var("EVOTING_SERVICE_URL").map_err(|_| {
            Error::InvalidConfiguration("EVOTING_SERVICE_URL must be set".to_string())
        })?;
        let mut config = Self::new(service_url);
        config.poll_interval_ms = env_or("EVOTING_POLL_INTERVAL_MS", config.poll_interval_ms)?;
        config.poll_max_attempts = env_or("EVOTING_POLL_MAX_ATTEMPTS", config.poll_max_attempts)?;
        config.http_timeout_ms = env_or("EVOTING_HTTP_TIMEOUT_MS", config.http_timeout_ms)?;
        Ok(config)
    }

    /// Base URL of the election service.
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Fixed interval between confirmation probes.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Hard cap on confirmation probes per action.
    pub fn poll_max_attempts(&self) -> u32 {
        self.poll_max_attempts
    }

    /// Timeout applied to every HTTP request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

fn env_or<V: std::str::FromStr>(name: &str, default: V) -> Result<V> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::InvalidConfiguration(format!("{name} is not a valid number"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let config = Config::new("http://service.example");
        assert_eq!(config.service_url(), "http://service.example");
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.poll_max_attempts(), 30);
    }

    #[test]
    fn from_env_requires_the_service_url() {
        env::remove_var("EVOTING_SERVICE_URL");
        assert!(matches!(
            Config::from_env(),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
