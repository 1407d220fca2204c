//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Combines defaults, the .env file, environment variables and CLI arguments
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref bind) = self.cli.bind {
            config.bind_address = bind.clone();
        }

        if let Some(timeout) = self.cli.timeout {
            config.sample_timeout_ms = timeout;
            // Keep the request ceiling at least as long as the deadline
            if config.request_timeout_ms < timeout {
                config.request_timeout_ms = timeout;
            }
        }

        if let Some(policy) = self.cli.timeout_policy {
            config.timeout_policy = policy;
        }

        if let Some(format) = self.cli.log_format {
            config.log_format = format;
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!(
                "Applied CLI overrides: bind={}, sample_timeout={}ms, policy={}",
                config.bind_address,
                config.sample_timeout_ms,
                config.timeout_policy.name()
            );
        }
    }
}

/// Load the complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Bind Address: {}", config.bind_address),
        format!("Sample Timeout: {}ms", config.sample_timeout_ms),
        format!("Request Timeout: {}ms", config.request_timeout_ms),
        format!("Timeout Policy: {}", config.timeout_policy.name()),
        format!("Color Output: {}", config.enable_color),
        format!("Log Format: {:?}", config.log_format),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}
