//! Command-line interface

use crate::logging::LogFormat;
use crate::types::TimeoutPolicy;
use clap::Parser;
use std::path::PathBuf;

/// Latency Probe - samples timed HTTP round-trips to a target
#[derive(Parser, Debug, Clone)]
#[command(name = "latency-probe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to serve the HTTP API on
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Per-sample timeout in milliseconds
    #[arg(short, long, value_name = "MS", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,

    /// What to do with a probe that misses its deadline (detach, abort)
    #[arg(long, value_name = "POLICY")]
    pub timeout_policy: Option<TimeoutPolicy>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Log format (console, json, compact)
    #[arg(long, value_name = "FMT")]
    pub log_format: Option<LogFormat>,

    /// Probe this URL once and print the results instead of serving
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Number of samples to take in one-shot mode
    #[arg(short, long, value_name = "N")]
    pub count: Option<u32>,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub create_env: Option<PathBuf>,

    /// Check an env file (default .env) for invalid entries and exit
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = ".env")]
    pub check_env: Option<PathBuf>,

    /// Describe the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.count.is_some() && self.url.is_none() {
            return Err("--count requires --url to be specified".to_string());
        }

        if let Some(ref url) = self.url {
            if url.trim().is_empty() {
                return Err("--url cannot be empty".to_string());
            }
        }

        let env_commands = [self.create_env.is_some(), self.check_env.is_some(), self.env_help]
            .iter()
            .filter(|&&set| set)
            .count();
        if env_commands > 1 {
            return Err("Use only one of --create-env, --check-env and --env-help".to_string());
        }
        if env_commands == 1 && self.is_one_shot() {
            return Err("--url cannot be combined with an env file command".to_string());
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        Ok(())
    }

    /// True when a single batch should run instead of the server
    pub fn is_one_shot(&self) -> bool {
        self.url.is_some()
    }

    /// Sample count for one-shot mode
    pub fn sample_count(&self) -> u32 {
        self.count.unwrap_or(crate::defaults::DEFAULT_SAMPLE_COUNT)
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

/// Parse a timeout in milliseconds
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|ms| {
            if ms == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if ms > crate::defaults::MAX_TIMEOUT_MS {
                Err(format!("Timeout cannot exceed {}ms", crate::defaults::MAX_TIMEOUT_MS))
            } else {
                Ok(ms)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    cfg!(unix)
}
