//! Data models and structures for the latency probe

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{AggregateResult, MeasurementBatch, MeasurementResult, Sample};
