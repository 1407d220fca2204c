//! Error handling for the latency probe

use thiserror::Error;

/// Message carried by every per-sample timeout
pub const TIMED_OUT_MESSAGE: &str = "timed out waiting for function to finish";

/// Custom error types for the latency probe
#[derive(Error, Debug)]
pub enum AppError {
    /// A sample did not finish before its deadline
    #[error("timed out waiting for function to finish")]
    TimedOut,

    /// The probe request failed at the transport level or returned a non-OK status
    #[error("unable to open target [{address}]")]
    UnreachableTarget { address: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP client/server plumbing errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O errors (sockets, files)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a timeout error
    pub fn timed_out() -> Self {
        Self::TimedOut
    }

    /// Create an unreachable-target error for the given address
    pub fn unreachable<S: Into<String>>(address: S) -> Self {
        Self::UnreachableTarget { address: address.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new HTTP error
    pub fn http<S: Into<String>>(message: S) -> Self {
        Self::Http(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::TimedOut => "TIMEOUT",
            Self::UnreachableTarget { .. } => "UNREACHABLE",
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Http(_) => "HTTP",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if error is recoverable (a later attempt could succeed).
    /// Sampling never retries on its own.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::TimedOut | Self::UnreachableTarget { .. } | Self::Http(_) | Self::Io(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) | Self::Internal(_) => false,
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::UnreachableTarget { .. } | Self::Http(_) => 2,
            Self::TimedOut => 3,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::UnreachableTarget { .. } | Self::Http(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::TimedOut => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::TimedOut
        } else {
            Self::http(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("Socket address parse error: {}", error))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_is_literal() {
        let error = AppError::timed_out();
        assert_eq!(error.to_string(), "timed out waiting for function to finish");
        assert_eq!(error.to_string(), TIMED_OUT_MESSAGE);
        assert_eq!(error.category(), "TIMEOUT");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_unreachable_message_embeds_address() {
        let error = AppError::unreachable("qwerty://-abcde-");
        assert_eq!(error.to_string(), "unable to open target [qwerty://-abcde-]");
        assert_eq!(error.category(), "UNREACHABLE");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AppError::timed_out().is_recoverable());
        assert!(AppError::unreachable("http://x").is_recoverable());
        assert!(AppError::io("reset").is_recoverable());

        assert!(!AppError::config("test").is_recoverable());
        assert!(!AppError::validation("test").is_recoverable());
        assert!(!AppError::parse("test").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("test").exit_code(), 1);
        assert_eq!(AppError::validation("test").exit_code(), 1);
        assert_eq!(AppError::http("test").exit_code(), 2);
        assert_eq!(AppError::io("test").exit_code(), 5);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::config("Test error");
        let plain = error.format_for_console(false);
        let colored = error.format_for_console(true);

        assert_eq!(plain, "[CONFIG] Configuration error: Test error");
        assert!(colored.contains("CONFIG"));
        assert!(colored.contains("Test error"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<u32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let addr_error = "nowhere".parse::<std::net::SocketAddr>().unwrap_err();
        let app_error: AppError = addr_error.into();
        assert!(app_error.to_string().contains("Socket address parse error"));

        let url_error = url::Url::parse("not a url").unwrap_err();
        let app_error: AppError = url_error.into();
        assert!(app_error.to_string().contains("URL parse error"));
    }

    #[test]
    fn test_dotenv_error_conversion() {
        let dotenv_error = dotenv::Error::LineParse(".env".to_string(), 1);
        let app_error: AppError = dotenv_error.into();
        assert_eq!(app_error.category(), "CONFIG");
        assert!(app_error.to_string().contains("Environment file error"));
    }

    #[test]
    fn test_anyhow_integration() {
        let app_error: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(app_error.category(), "INTERNAL");

        let wrapped = anyhow::anyhow!(AppError::timed_out());
        assert_eq!(wrapped.to_string(), TIMED_OUT_MESSAGE);
    }
}
