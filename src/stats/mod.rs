//! Latency aggregation: averaging and canonical duration rendering
//!
//! Durations are rendered in the compact `1h2m3.5s` / `2.5ms` / `350µs`
//! notation used throughout the probe's JSON output. The same formatter is
//! applied to every individual measurement and to the average.

use crate::models::AggregateResult;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const SECONDS_PER_MINUTE: u128 = 60;
const SECONDS_PER_HOUR: u128 = 3_600;

/// Reduce an ordered list of sample durations to its aggregate view
pub fn aggregate(durations: &[Duration]) -> AggregateResult {
    AggregateResult {
        measurements: format_all(durations),
        average_latency: format_duration(average(durations)),
    }
}

/// Truncating mean of the durations at nanosecond resolution.
/// An empty slice averages to zero.
pub fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }

    let total: u128 = durations.iter().map(Duration::as_nanos).sum();
    let mean = total / durations.len() as u128;

    // The mean never exceeds the largest input, so it fits back into a Duration
    Duration::new(
        (mean / NANOS_PER_SECOND) as u64,
        (mean % NANOS_PER_SECOND) as u32,
    )
}

/// Render each duration in order
pub fn format_all(durations: &[Duration]) -> Vec<String> {
    durations.iter().copied().map(format_duration).collect()
}

/// Render a duration in compact unit notation.
///
/// Sub-second values pick the largest unit that keeps the integer part
/// non-zero (`ns`, `µs`, `ms`). Larger values are split into hours,
/// minutes and seconds, with leading zero components omitted. Fractions
/// drop trailing zeros.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }

    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO, 3));
    }

    if nanos < NANOS_PER_SECOND {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI, 6));
    }

    let whole_seconds = nanos / NANOS_PER_SECOND;
    let hours = whole_seconds / SECONDS_PER_HOUR;
    let minutes = (whole_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = decimal(
        nanos % (SECONDS_PER_MINUTE * NANOS_PER_SECOND),
        NANOS_PER_SECOND,
        9,
    );

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `value / unit` as a decimal string with up to `digits` fractional digits
fn decimal(value: u128, unit: u128, digits: usize) -> String {
    let whole = value / unit;
    let fraction = value % unit;

    if fraction == 0 {
        return whole.to_string();
    }

    let padded = format!("{:0width$}", fraction, width = digits);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}
