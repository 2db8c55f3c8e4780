// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics for observability.
//!
//! Exports Prometheus-compatible metrics through the `metrics` facade. The
//! host installs whatever recorder/exporter it wants; without one every call
//! is a no-op.
//!
//! # Metric Naming Convention
//!
//! All metrics are prefixed with `mirror_`:
//! - Counters end in `_total`
//! - Gauges represent current state
//! - Histograms track durations

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record posts returned by a fetch.
pub fn record_posts_fetched(count: usize) {
    counter!("mirror_posts_fetched_total").increment(count as u64);
}

/// Record an absorbed fetch failure.
pub fn record_fetch_failure() {
    counter!("mirror_fetch_failures_total").increment(1);
}

/// Record a delivered message.
pub fn record_delivered(with_reply: bool) {
    let kind = if with_reply { "reply" } else { "plain" };
    counter!("mirror_messages_delivered_total", "kind" => kind).increment(1);
}

/// Record a sink rejection.
pub fn record_delivery_failure() {
    counter!("mirror_delivery_failures_total").increment(1);
}

/// Record a post that produced no message.
pub fn record_suppressed(reason: &str) {
    counter!("mirror_posts_suppressed_total", "reason" => reason.to_string()).increment(1);
}

/// Record posts dropped by the per-tick batch cap.
pub fn record_batch_overflow(count: usize) {
    if count > 0 {
        counter!("mirror_batch_overflow_total").increment(count as u64);
    }
}

/// Record an id mapping conflict.
pub fn record_mapping_conflict() {
    counter!("mirror_mapping_conflicts_total").increment(1);
}

/// Record a tick rejected because another one was in flight.
pub fn record_tick_skipped() {
    counter!("mirror_ticks_skipped_total").increment(1);
}

/// Record a completed tick.
pub fn record_tick(duration: Duration) {
    counter!("mirror_ticks_total").increment(1);
    histogram!("mirror_tick_duration_seconds").record(duration.as_secs_f64());
}

/// Record an outbound post to the source thread.
pub fn record_outbound_post(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("mirror_outbound_posts_total", "status" => status).increment(1);
}

/// Record an error by kind (see `MirrorError::kind`).
pub fn record_error(kind: &'static str, retryable: bool) {
    counter!(
        "mirror_errors_total",
        "kind" => kind,
        "retryable" => if retryable { "true" } else { "false" }
    )
    .increment(1);
}

/// Current watermark.
pub fn set_watermark(id: u64) {
    gauge!("mirror_watermark").set(id as f64);
}

/// Number of posts held in memory.
pub fn set_known_posts(count: usize) {
    gauge!("mirror_known_posts").set(count as f64);
}

/// Gauge for the polling loop (0=stopped, 1=running).
pub fn set_polling(running: bool) {
    gauge!("mirror_polling").set(if running { 1.0 } else { 0.0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder these must all be harmless no-ops.
    #[test]
    fn test_metrics_without_recorder() {
        record_posts_fetched(3);
        record_fetch_failure();
        record_delivered(true);
        record_delivery_failure();
        record_suppressed("blocked");
        record_batch_overflow(0);
        record_batch_overflow(10);
        record_mapping_conflict();
        record_tick_skipped();
        record_tick(Duration::from_millis(5));
        record_outbound_post(false);
        record_error("fetch", true);
        set_watermark(42);
        set_known_posts(7);
        set_polling(true);
    }
}
