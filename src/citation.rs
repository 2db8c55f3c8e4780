// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Citation resolution.
//!
//! A post that opens with a reply link (`>>12345`) cites an earlier post. The
//! resolver turns that link into a short summary of the cited post, decides
//! whether to show it at all, and finds the destination message to reply to.
//!
//! # Decision Order
//!
//! ```text
//! >>id ──► known? ──no──► (no citation)
//!            │yes
//!            ▼
//!       summary: blocked? ──yes──► 🚫 (always shown)
//!            │no
//!            ▼
//!       first plain line (≤ N chars + …) │ 📎 if media only │ none
//!            │
//!            ▼
//!       cites the immediate predecessor? ──yes──► suppressed
//!            │no
//!            ▼
//!       mirrored already? ──yes──► native reply_to
//!            │no
//!            ▼
//!       leading ">summary" line in the body
//! ```

use crate::classifier::ContentClassifier;
use crate::escape::escape;
use crate::id_map::IdMapper;
use crate::post::{MessageId, Post, PostId};
use std::collections::BTreeMap;

/// Summary shown for a cited post that has only media.
pub const ATTACHMENT_GLYPH: &str = "📎";

/// Summary shown for a cited post whose content is blocked.
pub const BLOCKED_GLYPH: &str = "🚫";

/// Appended to truncated summaries.
pub const ELLIPSIS: char = '…';

pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 40;

/// Whether `line` is a reply link: `>>` followed by one or more ASCII digits, nothing else.
pub fn is_reply_link(line: &str) -> bool {
    line.strip_prefix(">>")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// The post a reply-link line points to.
///
/// `None` if the line is not a reply link or the number does not fit a post id.
pub fn reply_link(line: &str) -> Option<PostId> {
    if !is_reply_link(line) {
        return None;
    }
    line[2..].parse().ok().map(PostId)
}

/// Truncate to `max_chars` characters, appending [`ELLIPSIS`] if anything was cut.
pub fn truncate(line: &str, max_chars: usize) -> String {
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
            out.push_str(&line[..cut]);
            out.push(ELLIPSIS);
            out
        }
        None => line.to_string(),
    }
}

/// The post immediately before `id` among known posts.
///
/// If `id` itself is not known yet, this is the largest known id.
pub fn immediate_predecessor(known: &BTreeMap<PostId, Post>, id: PostId) -> Option<PostId> {
    if known.contains_key(&id) {
        known.range(..id).next_back().map(|(k, _)| *k)
    } else {
        known.keys().next_back().copied()
    }
}

/// Preview of a cited post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// First plain line of the cited post, truncated, not yet escaped.
    Text(String),
    /// Cited post has no text line to show but carries media.
    Attachment,
    /// Cited content failed the content policy.
    Blocked,
}

impl Summary {
    /// Render for the destination: escaped text or a glyph.
    pub fn render(&self) -> String {
        match self {
            Summary::Text(text) => escape(text),
            Summary::Attachment => ATTACHMENT_GLYPH.to_string(),
            Summary::Blocked => BLOCKED_GLYPH.to_string(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Summary::Blocked)
    }
}

/// A citation that survived resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub target: PostId,
    /// Rendered (escaped) summary.
    pub summary: String,
    pub blocked: bool,
    /// Destination message to reply to, if the cited post was mirrored.
    pub reply_to: Option<MessageId>,
}

/// Builds citation summaries and applies the suppression rules.
#[derive(Debug, Clone)]
pub struct CitationResolver {
    classifier: ContentClassifier,
    max_chars: usize,
}

impl CitationResolver {
    pub fn new(classifier: ContentClassifier, max_chars: usize) -> Self {
        Self {
            classifier,
            max_chars,
        }
    }

    /// Summarize a cited post, or `None` when there is nothing to show.
    pub fn summarize(&self, cited: &Post) -> Option<Summary> {
        let text = cited.text.trim();
        if self.classifier.is_blocked(text) {
            return Some(Summary::Blocked);
        }

        let first_line = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .find(|line| !is_reply_link(line) && !line.starts_with('>'));

        match first_line {
            Some(line) => {
                let summary = truncate(line, self.max_chars);
                if self.classifier.is_blocked(&summary) {
                    Some(Summary::Blocked)
                } else {
                    Some(Summary::Text(summary))
                }
            }
            None if cited.has_media() => Some(Summary::Attachment),
            None => None,
        }
    }

    /// Resolve a citation from post `citing` to post `target`.
    ///
    /// Returns `None` when the target is unknown, has nothing to summarize,
    /// or is the immediate predecessor of `citing` (unless blocked).
    pub fn resolve(
        &self,
        citing: PostId,
        target: PostId,
        known: &BTreeMap<PostId, Post>,
        ids: &IdMapper,
    ) -> Option<Citation> {
        let cited = known.get(&target)?;
        let summary = self.summarize(cited)?;

        if !summary.is_blocked() && immediate_predecessor(known, citing) == Some(target) {
            tracing::trace!(citing = %citing, target = %target, "Citation of previous post suppressed");
            return None;
        }

        Some(Citation {
            target,
            summary: summary.render(),
            blocked: summary.is_blocked(),
            reply_to: ids.message_for(target),
        })
    }
}

impl Default for CitationResolver {
    fn default() -> Self {
        Self::new(ContentClassifier::new(), DEFAULT_SUMMARY_MAX_CHARS)
    }
}
