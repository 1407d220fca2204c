//! Per-sample deadline enforcement
//!
//! The guard races an action against a timer. The action is polled first on
//! every wake-up, so an action that is ready when the timer fires still wins.
//! On timeout the action is either detached onto the runtime (default) or
//! dropped, depending on [`TimeoutPolicy`].

use crate::error::{AppError, Result};
use crate::types::TimeoutPolicy;
use std::future::Future;
use std::time::Duration;

/// Races one action against a fixed deadline
#[derive(Debug, Clone, Copy)]
pub struct DeadlineGuard {
    timeout: Duration,
    policy: TimeoutPolicy,
}

impl DeadlineGuard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            policy: TimeoutPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Run `action` under the deadline.
    ///
    /// Returns the action's own outcome if it finishes first, otherwise
    /// [`AppError::TimedOut`].
    pub async fn run<F, T>(&self, action: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut action = Box::pin(action);

        let finished = tokio::select! {
            biased;
            outcome = &mut action => Some(outcome),
            _ = tokio::time::sleep(self.timeout) => None,
        };

        match finished {
            Some(outcome) => outcome,
            None => {
                if self.policy == TimeoutPolicy::Detach {
                    // The sample already failed with TimedOut, so a late result or
                    // error is dropped here. The HTTP client's own timeout bounds its lifetime
                    tokio::spawn(async move {
                        let _ = action.await;
                    });
                }
                Err(AppError::timed_out())
            }
        }
    }
}

/// Run `action` with a `timeout` deadline using the default policy
pub async fn with_deadline<F, T>(action: F, timeout: Duration) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    DeadlineGuard::new(timeout).run(action).await
}
