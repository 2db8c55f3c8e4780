// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Core data types: source posts and destination messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a post in the source thread.
///
/// Ids are unique and strictly increase in order of arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message in the destination chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post fetched from the source thread. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Plain text, lines separated by `\n`.
    pub text: String,
    /// Human readable creation time, e.g. `"Mon 14:03:27"`.
    pub display_timestamp: String,
    /// Absolute URL of the first attached image, if any.
    pub media_url: Option<String>,
}

impl Post {
    /// Create a post without timestamp or media.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id: PostId(id),
            text: text.into(),
            display_timestamp: String::new(),
            media_url: None,
        }
    }

    /// Attach a media URL.
    pub fn with_media(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }
}

/// A post rendered for the destination chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedMessage {
    /// Escaped message body, possibly prefixed by a `>citation` line.
    pub text: String,
    /// Native reply target when the cited post was already mirrored.
    pub reply_to: Option<MessageId>,
    /// The resolved citation summary (escaped), kept for diagnostics.
    pub citation: Option<String>,
    /// Media to send alongside the text (the text becomes the caption).
    pub media_url: Option<String>,
}

/// Why a post produced no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// The post text matched the content policy (full block).
    Blocked,
    /// Nothing left to show: no body lines and no media.
    Empty,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Empty => "empty",
        }
    }
}

/// Outcome of formatting one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatted {
    Message(FormattedMessage),
    Suppressed(SuppressReason),
}

impl Formatted {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }

    /// The message, if one should be delivered.
    pub fn message(&self) -> Option<&FormattedMessage> {
        match self {
            Self::Message(m) => Some(m),
            Self::Suppressed(_) => None,
        }
    }
}
