//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// What happens to an in-flight probe once its deadline has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Leave the probe running on the runtime and discard its outcome
    #[default]
    Detach,
    /// Drop the probe future, cancelling it at its next await point
    Abort,
}

impl TimeoutPolicy {
    /// Get a human-readable name for this policy
    pub fn name(&self) -> &'static str {
        match self {
            TimeoutPolicy::Detach => "detach",
            TimeoutPolicy::Abort => "abort",
        }
    }
}

impl std::str::FromStr for TimeoutPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "detach" => Ok(TimeoutPolicy::Detach),
            "abort" => Ok(TimeoutPolicy::Abort),
            _ => Err(AppError::parse(format!("Invalid timeout policy: {}", s))),
        }
    }
}
