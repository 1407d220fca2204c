//! Sample, batch and result data models

use crate::error::AppError;
use crate::stats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single probe
#[derive(Debug)]
pub enum Sample {
    /// The probe succeeded after this long
    Latency(Duration),
    /// The probe failed or missed its deadline
    Failed(AppError),
}

impl Sample {
    /// Build a sample from a measured outcome
    pub fn from_result(result: crate::error::Result<Duration>) -> Self {
        match result {
            Ok(duration) => Self::Latency(duration),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Ordered successful durations collected by one sampling run
#[derive(Debug, Clone)]
pub struct MeasurementBatch {
    requested: u32,
    durations: Vec<Duration>,
}

impl MeasurementBatch {
    /// Create an empty batch expecting `requested` samples
    pub fn new(requested: u32) -> Self {
        Self {
            requested,
            durations: Vec::with_capacity(requested.min(1024) as usize),
        }
    }

    /// Append the next successful duration
    pub fn push(&mut self, duration: Duration) {
        self.durations.push(duration);
    }

    /// Number of samples collected so far
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// True once every requested sample has been collected
    pub fn is_complete(&self) -> bool {
        self.durations.len() >= self.requested as usize
    }

    /// Compute the aggregate view of the collected durations
    pub fn aggregate(&self) -> AggregateResult {
        stats::aggregate(&self.durations)
    }
}

/// Formatted per-sample latencies plus their average
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// One entry per sample, in request order
    pub measurements: Vec<String>,

    /// Truncating mean of all samples
    #[serde(rename = "averageLatency")]
    pub average_latency: String,
}

/// Successful `/measure` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub host: String,
    pub protocol: String,
    pub results: AggregateResult,
}
