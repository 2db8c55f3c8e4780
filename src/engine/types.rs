// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tick state machine and tick results.
//!
//! # Phases of One Tick
//!
//! ```text
//!        tick()                 posts                batch
//! Idle ─────────► Fetching ─────────► Merging ─────────► Dispatching
//!  ▲                 │ (fetch failed / empty)                 │
//!  └─────────────────┴────────────────────────────────────────┘
//! ```
//!
//! A `tick()` that arrives while another one is past `Idle` is rejected with
//! [`TickOutcome::Skipped`]; it is never queued.

use crate::post::PostId;

/// Phase of the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// No tick in flight.
    Idle,
    /// Waiting on the source.
    Fetching,
    /// Adding fetched posts to the known-post store.
    Merging,
    /// Formatting and delivering posts in ascending id order.
    Dispatching,
}

impl std::fmt::Display for TickPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickPhase::Idle => write!(f, "Idle"),
            TickPhase::Fetching => write!(f, "Fetching"),
            TickPhase::Merging => write!(f, "Merging"),
            TickPhase::Dispatching => write!(f, "Dispatching"),
        }
    }
}

/// What happened to one post-processing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Posts returned by the source (after dropping already processed ids).
    pub fetched: usize,
    /// Oldest posts skipped by the batch cap.
    pub skipped_overflow: usize,
    /// Messages accepted by the sink.
    pub delivered: usize,
    /// Posts that produced no message (blocked or empty).
    pub suppressed: usize,
    /// Messages the sink rejected.
    pub failed: usize,
    /// Deliveries whose id pair could not be recorded.
    pub mapping_conflicts: usize,
    /// Watermark once the tick finished.
    pub watermark: Option<PostId>,
}

impl TickReport {
    /// Check if every delivery attempt succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Posts that went through formatting this tick.
    pub fn processed(&self) -> usize {
        self.delivered + self.suppressed + self.failed
    }
}

/// Result of calling [`MirrorEngine::tick`](super::MirrorEngine::tick).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another tick was in flight; nothing was done.
    Skipped,
    Completed(TickReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Completed(report) => Some(report),
            TickOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TickOutcome::Skipped)
    }
}
