// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Relaying chat messages back to the source thread.
//!
//! A chat reply to a mirrored message becomes a thread reply: the mapped
//! post id is prepended as a `>>id` line.

use super::MirrorEngine;
use crate::error::{MirrorError, Result};
use crate::metrics;
use crate::ports::{Outbound, Sink, Source};
use crate::post::MessageId;
use tracing::{info, warn};

/// A message typed in the destination chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: Option<String>,
    /// Caption of a photo message, used when there is no text.
    pub caption: Option<String>,
    /// The chat message this one replies to.
    pub reply_to: Option<MessageId>,
    /// Image bytes to attach to the post.
    pub attachment: Option<Vec<u8>>,
}

impl InboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn replying_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    pub fn with_attachment(mut self, bytes: Vec<u8>) -> Self {
        self.attachment = Some(bytes);
        self
    }

    /// Text, else caption, else empty.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

impl<S: Source, K: Sink> MirrorEngine<S, K> {
    /// Text to post to the thread for an inbound chat message.
    pub async fn translate_reply(&self, message: &InboundMessage) -> String {
        let body = message.body();
        let inner = self.inner.lock().await;
        let target = message
            .reply_to
            .and_then(|id| inner.ids.post_for(id))
            .filter(|post_id| inner.sync.contains(*post_id));

        match target {
            Some(post_id) => format!(">>{}\n{}", post_id, body),
            None => body.to_string(),
        }
    }

    /// Post an inbound chat message to the thread.
    ///
    /// Posting errors are returned to the caller (to be reported to the
    /// user who wrote the message); they are not retried.
    pub async fn relay_reply<O>(&self, outbound: &O, message: InboundMessage) -> Result<()>
    where
        O: Outbound + ?Sized,
    {
        let text = self.translate_reply(&message).await;
        match outbound.post(&text, message.attachment).await {
            Ok(()) => {
                info!(len = text.len(), reply_to = ?message.reply_to, "Posted reply to thread");
                metrics::record_outbound_post(true);
                Ok(())
            }
            Err(e) => {
                let err = MirrorError::from(e);
                warn!(error = %err, "Could not create a post");
                metrics::record_outbound_post(false);
                metrics::record_error(err.kind(), err.is_retryable());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_fallbacks() {
        assert_eq!(InboundMessage::text("hi").body(), "hi");
        let caption = InboundMessage {
            caption: Some("look".into()),
            ..Default::default()
        };
        assert_eq!(caption.body(), "look");
        assert_eq!(InboundMessage::default().body(), "");
    }

    #[test]
    fn test_builders() {
        let message = InboundMessage::text("x")
            .replying_to(MessageId(3))
            .with_attachment(vec![1, 2]);
        assert_eq!(message.reply_to, Some(MessageId(3)));
        assert_eq!(message.attachment.as_deref(), Some(&[1u8, 2][..]));
    }
}
