// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Polling loop: one tick per interval until shutdown.
//!
//! # Graceful Shutdown
//!
//! The loop uses `tokio::select!` so a shutdown signal is seen both while
//! waiting for the next interval and while a tick is in flight. An abandoned
//! tick keeps whatever watermark progress it already made; the next start
//! resumes from there.

use super::{MirrorEngine, TickOutcome};
use crate::metrics;
use crate::ports::{Sink, Source};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, Instrument};

/// Resolve once shutdown is signaled (or the signal sender is gone).
async fn shutdown_signaled(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Run the polling loop for `engine` until shutdown is signaled.
pub(super) async fn run_poller<S: Source, K: Sink>(
    engine: Arc<MirrorEngine<S, K>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let span = tracing::info_span!(
        "poller",
        board = %engine.thread().board,
        thread = engine.thread().thread
    );

    async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting thread polling");
        metrics::set_polling(true);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_signaled(&mut shutdown_rx) => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown_signaled(&mut shutdown_rx) => {
                    info!("Shutdown during tick, abandoning it");
                    break;
                }
                outcome = engine.tick() => {
                    if let TickOutcome::Completed(report) = outcome {
                        debug!(delivered = report.delivered, watermark = ?report.watermark, "Poll tick done");
                    }
                }
            }
        }

        metrics::set_polling(false);
        info!("Thread polling stopped");
    }
    .instrument(span)
    .await
}
