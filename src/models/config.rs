//! Configuration data model and validation

use crate::defaults;
use crate::logging::LogFormat;
use crate::types::{AppError, Result, TimeoutPolicy};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP front end listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Deadline applied to each individual sample
    #[serde(default = "default_sample_timeout_ms")]
    pub sample_timeout_ms: u64,

    /// Hard ceiling for a single HTTP request, including detached ones
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Fate of a probe that misses its deadline
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            sample_timeout_ms: default_sample_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            timeout_policy: TimeoutPolicy::default(),
            enable_color: default_enable_color(),
            log_format: LogFormat::default(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-sample deadline as a Duration
    pub fn sample_timeout(&self) -> Duration {
        Duration::from_millis(self.sample_timeout_ms)
    }

    /// HTTP request ceiling as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .map_err(|e| AppError::config(format!("Invalid bind address '{}': {}", self.bind_address, e)))
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.is_empty() {
            return Err(AppError::config("Bind address cannot be empty"));
        }
        self.socket_addr()?;

        if self.sample_timeout_ms == 0 {
            return Err(AppError::config("Sample timeout must be greater than 0"));
        }

        if self.sample_timeout_ms > defaults::MAX_TIMEOUT_MS {
            return Err(AppError::config(format!(
                "Sample timeout cannot exceed {}ms",
                defaults::MAX_TIMEOUT_MS
            )));
        }

        if self.request_timeout_ms < self.sample_timeout_ms {
            return Err(AppError::config(format!(
                "Request timeout ({}ms) must not be shorter than the sample timeout ({}ms)",
                self.request_timeout_ms, self.sample_timeout_ms
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
            self.bind_address = bind_address.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("SAMPLE_TIMEOUT_MS") {
            self.sample_timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SAMPLE_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid REQUEST_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(policy) = std::env::var("TIMEOUT_POLICY") {
            self.timeout_policy = policy.parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_POLICY value '{}': {}", policy, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(log_format) = std::env::var("LOG_FORMAT") {
            self.log_format = log_format.parse()
                .map_err(|e| AppError::config(format!("Invalid LOG_FORMAT value '{}': {}", log_format, e)))?;
        }

        Ok(())
    }
}

fn default_bind_address() -> String {
    defaults::DEFAULT_BIND_ADDRESS.to_string()
}

fn default_sample_timeout_ms() -> u64 {
    defaults::DEFAULT_SAMPLE_TIMEOUT.as_millis() as u64
}

fn default_request_timeout_ms() -> u64 {
    defaults::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.sample_timeout(), Duration::from_millis(5000));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Console);
        assert_eq!(config.timeout_policy, TimeoutPolicy::Detach);
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = Config {
            bind_address: "not-an-address".to_string(),
            ..Default::default()
        };
        let error = config.validate().unwrap_err();
        assert_eq!(error.category(), "CONFIG");
        assert!(error.to_string().contains("not-an-address"));
    }

    #[test]
    fn test_timeout_bounds() {
        let zero = Config { sample_timeout_ms: 0, ..Default::default() };
        assert!(zero.validate().is_err());

        let huge = Config {
            sample_timeout_ms: defaults::MAX_TIMEOUT_MS + 1,
            request_timeout_ms: defaults::MAX_TIMEOUT_MS + 1,
            ..Default::default()
        };
        assert!(huge.validate().is_err());

        let inverted = Config {
            sample_timeout_ms: 10_000,
            request_timeout_ms: 1_000,
            ..Default::default()
        };
        assert!(inverted.validate().unwrap_err().to_string().contains("Request timeout"));
    }

    #[test]
    fn test_serde_defaults() {
        let config: Config = serde_json::from_str(r#"{"sample_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.sample_timeout_ms, 250);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert!(config.enable_color);
        assert!(!config.debug);
    }
}
