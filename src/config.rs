// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the thread mirror.
//!
//! Configuration is passed to [`MirrorEngine::new()`](crate::MirrorEngine::new)
//! and can be constructed programmatically or deserialized from YAML/JSON.
//! Credentials (passcodes, bot tokens) belong to the transport layer and are
//! not part of this config.
//!
//! # Configuration Structure
//!
//! ```text
//! MirrorConfig
//! ├── source: ThreadRef            # base_url, board, thread
//! └── settings: MirrorSettings
//!     ├── poll: PollConfig         # tick interval, batch cap
//!     ├── citation: CitationConfig # summary length
//!     └── filter: FilterConfig     # denylist on/off, custom pattern
//! ```
//!
//! # YAML Example
//!
//! ```yaml
//! source:
//!   board: "b"
//!   thread: 301234567
//!
//! settings:
//!   poll:
//!     interval: "5s"
//!     max_batch: 50
//!   citation:
//!     summary_max_chars: 40
//!   filter:
//!     enabled: true
//! ```

use crate::citation::DEFAULT_SUMMARY_MAX_CHARS;
use crate::classifier::ContentClassifier;
use crate::error::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Top-level config
// ═══════════════════════════════════════════════════════════════════════════════

/// The top-level config object passed to `MirrorEngine::new()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// The thread being mirrored.
    pub source: ThreadRef,

    /// Tunables for polling, citations and filtering.
    #[serde(default)]
    pub settings: MirrorSettings,
}

impl MirrorConfig {
    /// Create a minimal config for testing.
    pub fn for_testing(board: &str, thread: u64) -> Self {
        Self {
            source: ThreadRef::new(board, thread),
            settings: MirrorSettings {
                poll: PollConfig {
                    interval: "10ms".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.source.board.trim().is_empty() {
            return Err(MirrorError::Config("source.board must not be empty".into()));
        }
        if self.source.thread == 0 {
            return Err(MirrorError::Config("source.thread must be a post number".into()));
        }
        if self.settings.poll.interval_duration().is_zero() {
            return Err(MirrorError::Config("settings.poll.interval must be > 0".into()));
        }
        if self.settings.poll.max_batch == 0 {
            return Err(MirrorError::Config("settings.poll.max_batch must be > 0".into()));
        }
        if self.settings.citation.summary_max_chars == 0 {
            return Err(MirrorError::Config(
                "settings.citation.summary_max_chars must be > 0".into(),
            ));
        }
        self.settings.filter.classifier().map(|_| ())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ThreadRef: which thread to mirror
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifies the source thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRef {
    /// Site root used to build endpoint and media URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Board short name, e.g. `"b"`.
    pub board: String,

    /// Thread number (the id of the opening post).
    pub thread: u64,
}

fn default_base_url() -> String {
    "https://2ch.hk".to_string()
}

impl ThreadRef {
    pub fn new(board: &str, thread: u64) -> Self {
        Self {
            base_url: default_base_url(),
            board: board.to_string(),
            thread,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MirrorSettings
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MirrorSettings {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub citation: CitationConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Polling loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Time between ticks (humantime format, e.g. "5s", "500ms").
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Maximum number of posts delivered per tick. The highest ids win.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}

fn default_interval() -> String {
    "5s".to_string()
}

fn default_max_batch() -> usize {
    50
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            max_batch: default_max_batch(),
        }
    }
}

impl PollConfig {
    /// Parse the interval string to a Duration.
    pub fn interval_duration(&self) -> Duration {
        humantime::parse_duration(&self.interval).unwrap_or(Duration::from_secs(5))
    }
}

/// Citation rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationConfig {
    /// Summary length in characters before the ellipsis.
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

fn default_summary_max_chars() -> usize {
    DEFAULT_SUMMARY_MAX_CHARS
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

/// Content policy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Custom denylist regex. The built-in denylist is used when absent.
    #[serde(default)]
    pub pattern: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern: None,
        }
    }
}

impl FilterConfig {
    /// Build the classifier this config describes.
    pub fn classifier(&self) -> Result<ContentClassifier> {
        match (self.enabled, &self.pattern) {
            (false, _) => Ok(ContentClassifier::allow_all()),
            (true, Some(pattern)) => ContentClassifier::with_pattern(pattern),
            (true, None) => Ok(ContentClassifier::new()),
        }
    }
}
