// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the thread mirror.
//!
//! Nothing in the core is fatal to the process. Every failure either degrades
//! to "skip and continue" inside a tick, or is surfaced to the caller of one
//! action (an inbound reply relay, a start/stop request).
//!
//! # Error Categories
//!
//! | Error Type | Retryable | Handling |
//! |------------|-----------|----------|
//! | `Fetch` | Yes | Absorbed by the tick, retried naturally on the next tick |
//! | `Delivery` | Yes | Logged, item skipped, watermark still advances |
//! | `Posting` | No | Surfaced to whoever triggered the outbound post |
//! | `Consistency` | No | Logged, mapping insertion skipped |
//! | `Config` | No | Fix the configuration |
//! | `InvalidState` | No | Polling loop started/stopped twice |
//! | `Internal` | No | Unexpected internal error |

use crate::ports::{DeliveryError, FetchError, PostingError};
use crate::post::{MessageId, PostId};
use thiserror::Error;

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while mirroring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// Network or parse failure while fetching from the source thread.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The sink rejected a specific message.
    #[error("Delivery error (post {post_id}): {message}")]
    Delivery { post_id: PostId, message: String },

    /// The source rejected an outbound post.
    #[error("Posting failed: {0}")]
    Posting(String),

    /// An id mapping would break injectivity.
    ///
    /// `existing` describes the counterpart that is already recorded.
    #[error("Id mapping conflict: post {post_id} -> message {message_id} ({existing})")]
    Consistency {
        post_id: PostId,
        message_id: MessageId,
        existing: String,
    },

    /// Invalid configuration or denylist pattern.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation attempted in the wrong lifecycle state.
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MirrorError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(_) => true,
            Self::Delivery { .. } => true,
            Self::Posting(_) => false, // reported back to the user instead
            Self::Consistency { .. } => false,
            Self::Config(_) => false,
            Self::InvalidState { .. } => false,
            Self::Internal(_) => false,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Delivery { .. } => "delivery",
            Self::Posting(_) => "posting",
            Self::Consistency { .. } => "consistency",
            Self::Config(_) => "config",
            Self::InvalidState { .. } => "invalid_state",
            Self::Internal(_) => "internal",
        }
    }
}

impl MirrorError {
    /// A sink rejection of the message for `post_id`.
    pub fn delivery(post_id: PostId, e: DeliveryError) -> Self {
        Self::Delivery {
            post_id,
            message: e.0,
        }
    }
}

impl From<FetchError> for MirrorError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e.0)
    }
}

impl From<PostingError> for MirrorError {
    fn from(e: PostingError) -> Self {
        Self::Posting(e.0)
    }
}

impl From<regex::Error> for MirrorError {
    fn from(e: regex::Error) -> Self {
        Self::Config(format!("invalid pattern: {}", e))
    }
}
