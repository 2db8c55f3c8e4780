// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! I/O seams of the mirror.
//!
//! The engine never talks HTTP or a chat SDK directly. The host provides:
//!
//! 1. a [`Source`] that fetches posts from the thread,
//! 2. a [`Sink`] that delivers formatted messages to the chat,
//! 3. an [`Outbound`] poster that publishes replies back to the thread.
//!
//! Errors at these seams are plain values; the engine decides whether to
//! absorb them (fetch, delivery) or surface them (posting).
//!
//! # Example
//!
//! ```rust,no_run
//! use thread_mirror::ports::{BoxFuture, DeliveryError, Sink};
//! use thread_mirror::{FormattedMessage, MessageId};
//!
//! struct ChatSink { /* bot client */ }
//!
//! impl Sink for ChatSink {
//!     fn deliver(&self, message: &FormattedMessage) -> BoxFuture<'_, MessageId, DeliveryError> {
//!         let text = message.text.clone();
//!         Box::pin(async move {
//!             let _ = text; // send_message / send_photo with MarkdownV2
//!             Ok(MessageId(1))
//!         })
//!     }
//! }
//! ```

use crate::config::ThreadRef;
use crate::post::{FormattedMessage, MessageId, Post, PostId};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Type alias for boxed async results at the I/O seams.
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = std::result::Result<T, E>> + Send + 'a>>;

/// Network or parse failure while reading the thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// The chat rejected a message (transport or policy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

/// The thread rejected an outbound post.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PostingError(pub String);

pub type FetchResult<T> = std::result::Result<T, FetchError>;
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;
pub type PostingResult<T> = std::result::Result<T, PostingError>;

/// Upstream feed of posts.
pub trait Source: Send + Sync + 'static {
    /// Fetch the whole thread snapshot (first tick, watermark unset).
    fn fetch_all(&self, thread: &ThreadRef) -> BoxFuture<'_, Vec<Post>, FetchError>;

    /// Fetch posts with id strictly greater than `after`.
    fn fetch_since(&self, after: PostId) -> BoxFuture<'_, Vec<Post>, FetchError>;
}

/// Destination chat.
pub trait Sink: Send + Sync + 'static {
    /// Deliver one message, returning the id the chat assigned to it.
    fn deliver(&self, message: &FormattedMessage) -> BoxFuture<'_, MessageId, DeliveryError>;
}

/// Posting back to the source thread.
pub trait Outbound: Send + Sync {
    /// Publish `text`, optionally with an image attachment.
    fn post(&self, text: &str, attachment: Option<Vec<u8>>) -> BoxFuture<'_, (), PostingError>;
}

/// A dry-run sink.
///
/// Logs every message and hands out sequential ids, so the mapping and reply
/// threading behave as they would against a real chat.
#[derive(Debug)]
pub struct NoOpSink {
    next_id: AtomicI64,
}

impl NoOpSink {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for NoOpSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for NoOpSink {
    fn deliver(&self, message: &FormattedMessage) -> BoxFuture<'_, MessageId, DeliveryError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        tracing::debug!(
            message_id = %id,
            reply_to = ?message.reply_to,
            len = message.text.len(),
            has_media = message.media_url.is_some(),
            "NoOp: would deliver message"
        );
        Box::pin(async move { Ok(id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> FormattedMessage {
        FormattedMessage {
            text: text.to_string(),
            reply_to: None,
            citation: None,
            media_url: None,
        }
    }

    #[tokio::test]
    async fn test_noop_sink_assigns_sequential_ids() {
        let sink = NoOpSink::new();
        assert_eq!(sink.deliver(&message("a")).await.unwrap(), MessageId(1));
        assert_eq!(sink.deliver(&message("b")).await.unwrap(), MessageId(2));
    }

    #[test]
    fn test_port_error_display() {
        assert_eq!(FetchError("timeout".into()).to_string(), "timeout");
        let err = DeliveryError("Bad Request".into());
        let _: &dyn std::error::Error = &err;
        assert_eq!(PostingError("banned".into()).clone().0, "banned");
    }
}
