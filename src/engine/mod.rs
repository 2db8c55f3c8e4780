// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Mirror engine.
//!
//! The orchestrator that ties together:
//! - Fetching from the thread via [`crate::ports::Source`]
//! - The known-post store and watermark ([`SyncState`])
//! - Formatting via [`crate::format::Formatter`]
//! - Delivery via [`crate::ports::Sink`] and the [`crate::id_map::IdMapper`]
//! - Relaying chat replies back to the thread via [`crate::ports::Outbound`]
//!
//! # Concurrency
//!
//! One tick at a time: an atomic flag rejects overlapping ticks. All mutable
//! state sits behind a single mutex that is never held across a source or
//! sink await, so an inbound reply can be translated while a tick is busy
//! delivering.

mod dispatch;
mod inbound;
mod poller;
mod state;
mod types;

pub use dispatch::select_batch;
pub use inbound::InboundMessage;
pub use state::SyncState;
pub use types::{TickOutcome, TickPhase, TickReport};

use crate::config::{MirrorConfig, ThreadRef};
use crate::error::{MirrorError, Result};
use crate::format::Formatter;
use crate::id_map::IdMapper;
use crate::metrics;
use crate::ports::{NoOpSink, Sink, Source};
use crate::post::{MessageId, PostId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// State guarded by the engine mutex.
#[derive(Debug, Default)]
pub(crate) struct EngineInner {
    pub(crate) sync: SyncState,
    pub(crate) ids: IdMapper,
}

/// Mirrors one source thread into one sink.
pub struct MirrorEngine<S: Source, K: Sink = NoOpSink> {
    /// The thread being mirrored.
    thread: ThreadRef,

    /// Per-tick delivery cap.
    max_batch: usize,

    /// Polling interval for [`start()`](Self::start).
    interval: Duration,

    formatter: Formatter,
    source: Arc<S>,
    sink: Arc<K>,

    /// Known posts, watermark and id mapping.
    inner: Mutex<EngineInner>,

    /// Set while a tick runs.
    in_flight: AtomicBool,

    phase_tx: watch::Sender<TickPhase>,
    phase_rx: watch::Receiver<TickPhase>,

    /// Shutdown signal for the polling task.
    shutdown_tx: watch::Sender<bool>,

    /// Polling task handle, present while running.
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Source> MirrorEngine<S, NoOpSink> {
    /// Dry-run engine: formats and logs instead of delivering.
    pub fn dry_run(config: MirrorConfig, source: Arc<S>) -> Result<Self> {
        Self::new(config, source, Arc::new(NoOpSink::new()))
    }
}

impl<S: Source, K: Sink> MirrorEngine<S, K> {
    /// Create an engine. Fails if the config is invalid.
    pub fn new(config: MirrorConfig, source: Arc<S>, sink: Arc<K>) -> Result<Self> {
        config.validate()?;
        let settings = &config.settings;
        let classifier = settings.filter.classifier()?;
        let (phase_tx, phase_rx) = watch::channel(TickPhase::Idle);
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            max_batch: settings.poll.max_batch,
            interval: settings.poll.interval_duration(),
            formatter: Formatter::new(classifier, settings.citation.summary_max_chars),
            thread: config.source,
            source,
            sink,
            inner: Mutex::new(EngineInner::default()),
            in_flight: AtomicBool::new(false),
            phase_tx,
            phase_rx,
            shutdown_tx,
            poller: Mutex::new(None),
        })
    }

    pub fn thread(&self) -> &ThreadRef {
        &self.thread
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn sink(&self) -> &Arc<K> {
        &self.sink
    }

    /// Current tick phase.
    pub fn phase(&self) -> TickPhase {
        *self.phase_rx.borrow()
    }

    /// Get a receiver to watch phase changes.
    pub fn phase_receiver(&self) -> watch::Receiver<TickPhase> {
        self.phase_rx.clone()
    }

    pub async fn watermark(&self) -> Option<PostId> {
        self.inner.lock().await.sync.watermark()
    }

    pub async fn known_post_count(&self) -> usize {
        self.inner.lock().await.sync.len()
    }

    /// Destination message a post was mirrored as.
    pub async fn message_for(&self, post_id: PostId) -> Option<MessageId> {
        self.inner.lock().await.ids.message_for(post_id)
    }

    /// Source post behind a destination message.
    pub async fn post_for(&self, message_id: MessageId) -> Option<PostId> {
        self.inner.lock().await.ids.post_for(message_id)
    }

    fn set_phase(&self, phase: TickPhase) {
        self.phase_tx.send_replace(phase);
    }

    /// Run one fetch → merge → dispatch pass.
    ///
    /// Returns [`TickOutcome::Skipped`] without doing anything if another tick
    /// is still in flight. Fetch failures are absorbed: the tick completes with
    /// no state change and the next tick retries.
    #[instrument(skip(self), fields(board = %self.thread.board, thread = self.thread.thread))]
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = TickGuard::acquire(self) else {
            debug!("Tick already in flight, skipping");
            metrics::record_tick_skipped();
            return TickOutcome::Skipped;
        };

        let started = Instant::now();
        let report = self.run_tick().await;
        metrics::record_tick(started.elapsed());

        if report.fetched > 0 {
            info!(
                fetched = report.fetched,
                delivered = report.delivered,
                suppressed = report.suppressed,
                failed = report.failed,
                skipped_overflow = report.skipped_overflow,
                watermark = ?report.watermark,
                "Tick complete"
            );
        }

        TickOutcome::Completed(report)
    }

    async fn run_tick(&self) -> TickReport {
        self.set_phase(TickPhase::Fetching);
        let watermark = self.inner.lock().await.sync.watermark();

        let fetched = match watermark {
            None => self.source.fetch_all(&self.thread).await,
            Some(after) => self.source.fetch_since(after).await,
        };

        let mut report = TickReport {
            watermark,
            ..Default::default()
        };

        let mut posts = match fetched {
            Ok(posts) => posts,
            Err(e) => {
                let err = MirrorError::from(e);
                warn!(error = %err, retryable = err.is_retryable(), watermark = ?watermark, "Fetch failed");
                metrics::record_fetch_failure();
                metrics::record_error(err.kind(), err.is_retryable());
                return report;
            }
        };
        metrics::record_posts_fetched(posts.len());

        // A source may resend ids we already processed; they never dispatch twice.
        posts.retain(|p| watermark.map_or(true, |w| p.id > w));
        if posts.is_empty() {
            return report;
        }

        self.set_phase(TickPhase::Merging);
        {
            let mut inner = self.inner.lock().await;
            let added = inner.sync.merge(posts.iter().cloned());
            debug!(fetched = posts.len(), added, "Merged posts");
            metrics::set_known_posts(inner.sync.len());
        }

        self.set_phase(TickPhase::Dispatching);
        let (batch, overflow) = select_batch(posts, self.max_batch);
        report.fetched = batch.len() + overflow;
        report.skipped_overflow = overflow;
        if overflow > 0 {
            warn!(overflow, cap = self.max_batch, "Batch over cap, skipping oldest posts");
            metrics::record_batch_overflow(overflow);
        }

        self.dispatch(batch, &mut report).await;
        report
    }

    /// Start polling the thread every configured interval.
    ///
    /// The first tick runs immediately. Fails if polling is already running.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let mut poller = self.poller.lock().await;
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(MirrorError::InvalidState {
                expected: "Stopped".to_string(),
                actual: "Running".to_string(),
            });
        }

        self.shutdown_tx.send_replace(false);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let engine = Arc::clone(self);
        *poller = Some(tokio::spawn(poller::run_poller(engine, self.interval, shutdown_rx)));

        info!(board = %self.thread.board, thread = self.thread.thread, "Monitoring started");
        Ok(())
    }

    /// Stop polling. A tick in flight is abandoned; progress already made is kept.
    pub async fn stop(&self) -> Result<()> {
        let handle = self.poller.lock().await.take();
        let Some(handle) = handle else {
            return Err(MirrorError::InvalidState {
                expected: "Running".to_string(),
                actual: "Stopped".to_string(),
            });
        };

        self.shutdown_tx.send_replace(true);
        handle
            .await
            .map_err(|e| MirrorError::Internal(format!("polling task failed: {}", e)))?;

        info!(board = %self.thread.board, thread = self.thread.thread, "Monitoring stopped");
        Ok(())
    }

    /// Whether the polling task is running.
    pub async fn is_running(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Marks a tick as in flight; clears the flag and resets the phase on drop,
/// including when the tick future is abandoned mid-way.
struct TickGuard<'a> {
    in_flight: &'a AtomicBool,
    phase_tx: &'a watch::Sender<TickPhase>,
}

impl<'a> TickGuard<'a> {
    fn acquire<S: Source, K: Sink>(engine: &'a MirrorEngine<S, K>) -> Option<Self> {
        engine
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            in_flight: &engine.in_flight,
            phase_tx: &engine.phase_tx,
        })
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.phase_tx.send_replace(TickPhase::Idle);
        self.in_flight.store(false, Ordering::Release);
    }
}
