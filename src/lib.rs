//! Latency Probe
//!
//! Measures round-trip latency to a target by issuing a fixed number of
//! sequential HTTP probes, each bounded by a per-sample deadline, and reports
//! every sample plus their average as human-readable duration strings.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod server;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use client::{build_target_url, NetworkClient, Probe};
pub use error::{AppError, Result};
pub use executor::{DeadlineGuard, SamplingExecutor};
pub use models::{AggregateResult, Config, MeasurementBatch, MeasurementResult, Sample};
pub use types::TimeoutPolicy;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
    pub const DEFAULT_SAMPLE_TIMEOUT: Duration = Duration::from_millis(5000);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_SAMPLE_COUNT: u32 = 5;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const MAX_TIMEOUT_MS: u64 = 300_000;
}
