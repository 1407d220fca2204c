//! Sampling engine
//!
//! This module contains the components that turn one `/measure` request into
//! a latency report:
//! - [`timing`] measures a single probe
//! - [`deadline`] bounds each probe by the per-sample timeout
//! - [`SamplingExecutor`] drives the probes strictly in sequence and fails
//!   the whole batch on the first bad sample

pub mod deadline;
pub mod timing;

pub use deadline::{with_deadline, DeadlineGuard};
pub use timing::measure;

use crate::{
    client::{NetworkClient, Probe},
    error::Result,
    logging::ProbeLogger,
    models::{AggregateResult, Config, MeasurementBatch, Sample},
    types::TimeoutPolicy,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sequential, fail-fast sampler
#[derive(Clone)]
pub struct SamplingExecutor {
    probe: Arc<dyn Probe>,
    policy: TimeoutPolicy,
    logger: ProbeLogger,
}

impl SamplingExecutor {
    /// Create an executor around any probe implementation
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self {
            probe,
            policy: TimeoutPolicy::default(),
            logger: ProbeLogger::quiet(),
        }
    }

    /// Create an executor probing over HTTP with settings from `config`
    pub fn from_config(config: &Config, logger: ProbeLogger) -> Result<Self> {
        let client = NetworkClient::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(client))
            .with_policy(config.timeout_policy)
            .with_logger(logger))
    }

    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Probe `target` `samples` times, one at a time, each under `timeout`.
    ///
    /// Zero samples is a valid request and yields an empty report. The first
    /// failed sample ends the run with that sample's error and any durations
    /// already collected are discarded.
    pub async fn run(&self, target: &str, samples: u32, timeout: Duration) -> Result<AggregateResult> {
        let correlation_id = self.logger.start_batch(target, samples, timeout).await;
        let started = Instant::now();

        let guard = DeadlineGuard::new(timeout).with_policy(self.policy);
        let mut batch = MeasurementBatch::new(samples);

        while !batch.is_complete() {
            let index = batch.len() as u32;
            let probe = Arc::clone(&self.probe);
            let address = target.to_string();
            let outcome = guard
                .run(measure(move || async move { probe.probe(&address).await }))
                .await;

            match Sample::from_result(outcome) {
                Sample::Latency(latency) => {
                    self.logger.log_sample(&correlation_id, index, latency).await;
                    batch.push(latency);
                }
                Sample::Failed(error) => {
                    self.logger.log_sample_failure(&correlation_id, index, &error).await;
                    return Err(error);
                }
            }
        }

        let result = batch.aggregate();
        self.logger
            .log_batch_complete(&correlation_id, &result, started.elapsed())
            .await;

        Ok(result)
    }
}
