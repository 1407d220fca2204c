//! Wall-clock measurement of a single probe action

use crate::error::Result;
use std::future::Future;
use std::time::{Duration, Instant};

/// Invoke `action` once and return how long it took to succeed.
///
/// The end instant is taken only on success; a failing action returns its
/// error unchanged and no duration.
pub async fn measure<F, Fut>(action: F) -> Result<Duration>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let start = Instant::now();
    action().await?;
    Ok(start.elapsed())
}
