//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::logging::LogFormat;
use crate::types::TimeoutPolicy;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the working directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists. Variables already present in
    /// the process environment are left untouched.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Latency Probe Configuration
#
# Values here are used as defaults and can be overridden by real
# environment variables and then by command-line arguments.

# Address the HTTP API listens on
# BIND_ADDRESS=0.0.0.0:8080

# Deadline for each individual sample, in milliseconds (1-300000)
# SAMPLE_TIMEOUT_MS=5000

# Hard ceiling for a single HTTP request, in milliseconds.
# Must not be shorter than SAMPLE_TIMEOUT_MS.
# REQUEST_TIMEOUT_MS=30000

# What happens to a probe that misses its deadline (detach, abort)
# TIMEOUT_POLICY=detach

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Log format (console, json, compact)
# LOG_FORMAT=console
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;
        Ok(())
    }

    /// Validate an environment variable value before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "BIND_ADDRESS" => {
                value
                    .parse::<std::net::SocketAddr>()
                    .map_err(|e| AppError::config(format!("Invalid BIND_ADDRESS value '{}': {}", value, e)))?;
            }
            "SAMPLE_TIMEOUT_MS" | "REQUEST_TIMEOUT_MS" => {
                let timeout: u64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if timeout == 0 || timeout > crate::defaults::MAX_TIMEOUT_MS {
                    return Err(AppError::config(format!(
                        "{} must be between 1 and {}, got: {}",
                        key,
                        crate::defaults::MAX_TIMEOUT_MS,
                        timeout
                    )));
                }
            }
            "TIMEOUT_POLICY" => {
                value
                    .parse::<TimeoutPolicy>()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_POLICY value '{}': {}", value, e)))?;
            }
            "ENABLE_COLOR" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            "LOG_FORMAT" => {
                value
                    .parse::<LogFormat>()
                    .map_err(|e| AppError::config(format!("Invalid LOG_FORMAT value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// All supported environment variables with descriptions and examples
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("BIND_ADDRESS", "Listen address for the HTTP API", "0.0.0.0:8080"),
            ("SAMPLE_TIMEOUT_MS", "Per-sample deadline in milliseconds", "5000"),
            ("REQUEST_TIMEOUT_MS", "HTTP request ceiling in milliseconds", "30000"),
            ("TIMEOUT_POLICY", "Fate of a timed out probe (detach, abort)", "detach"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("LOG_FORMAT", "Log format (console, json, compact)", "json"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<20} {}\n", var, description));
            help.push_str(&format!("  {:<20} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Check an env file and collect a warning per invalid line
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let warnings = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                Self::validate_env_var(key.trim(), value.trim())
                    .err()
                    .map(|e| format!("Line '{}': {}", line, e))
            })
            .collect();

        Ok(Some(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Latency Probe Configuration"));
    }

    #[test]
    fn test_example_file_has_no_warnings() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let warnings = EnvManager::check_env_file(temp_file.path()).unwrap().unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("BIND_ADDRESS", "127.0.0.1:8080").is_ok());
        assert!(EnvManager::validate_env_var("SAMPLE_TIMEOUT_MS", "5000").is_ok());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_MS", "300000").is_ok());
        assert!(EnvManager::validate_env_var("TIMEOUT_POLICY", "abort").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("LOG_FORMAT", "compact").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());

        assert!(EnvManager::validate_env_var("BIND_ADDRESS", "localhost").is_err());
        assert!(EnvManager::validate_env_var("SAMPLE_TIMEOUT_MS", "0").is_err());
        assert!(EnvManager::validate_env_var("SAMPLE_TIMEOUT_MS", "300001").is_err());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_MS", "soon").is_err());
        assert!(EnvManager::validate_env_var("TIMEOUT_POLICY", "retry").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("LOG_FORMAT", "xml").is_err());
    }

    #[test]
    fn test_enum_values_fail_as_config_errors() {
        let policy = EnvManager::validate_env_var("TIMEOUT_POLICY", "retry").unwrap_err();
        assert_eq!(policy.category(), "CONFIG");
        assert!(policy.to_string().contains("Invalid TIMEOUT_POLICY value 'retry'"));

        let format = EnvManager::validate_env_var("LOG_FORMAT", "xml").unwrap_err();
        assert_eq!(format.category(), "CONFIG");
        assert!(format.to_string().contains("Invalid LOG_FORMAT value 'xml'"));
    }

    #[test]
    fn test_check_env_file_reports_bad_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "SAMPLE_TIMEOUT_MS=250").unwrap();
        writeln!(file, "LOG_FORMAT=xml").unwrap();
        writeln!(file, "BIND_ADDRESS=nowhere").unwrap();

        let warnings = EnvManager::check_env_file(file.path()).unwrap().unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("LOG_FORMAT=xml"));
        assert!(warnings[1].contains("BIND_ADDRESS=nowhere"));
    }

    #[test]
    fn test_check_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EnvManager::check_env_file(&dir.path().join(".env")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_env_file_sets_variables() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "LATENCY_PROBE_ENV_FILE_TEST=loaded").unwrap();

        EnvManager::load_env_file_from(file.path(), false).unwrap();
        assert_eq!(std::env::var("LATENCY_PROBE_ENV_FILE_TEST").unwrap(), "loaded");
        std::env::remove_var("LATENCY_PROBE_ENV_FILE_TEST");
    }

    #[test]
    fn test_load_missing_env_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EnvManager::load_env_file_from(&dir.path().join(".env"), true).is_ok());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("SAMPLE_TIMEOUT_MS"));
        assert!(help.contains("Configuration Priority"));
    }
}
