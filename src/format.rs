// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Rendering of source posts into destination messages.
//!
//! 1. Full block: a post whose text fails the content policy is suppressed.
//! 2. Body: blank lines skipped, reply links dropped, every other line escaped
//!    (quote lines keep their leading `>`).
//! 3. Citation: only the first reply link before any body line is resolved.
//! 4. A body that already opens with a quote drops the textual citation.

use crate::citation::{is_reply_link, reply_link, CitationResolver};
use crate::classifier::ContentClassifier;
use crate::escape::escape_line;
use crate::id_map::IdMapper;
use crate::post::{Formatted, FormattedMessage, Post, PostId, SuppressReason};
use std::collections::BTreeMap;

/// Formats posts for the destination chat.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    classifier: ContentClassifier,
    resolver: CitationResolver,
}

impl Formatter {
    pub fn new(classifier: ContentClassifier, summary_max_chars: usize) -> Self {
        Self {
            resolver: CitationResolver::new(classifier.clone(), summary_max_chars),
            classifier,
        }
    }

    /// Format `post` against the current known posts and id mapping.
    pub fn format(
        &self,
        post: &Post,
        known: &BTreeMap<PostId, Post>,
        ids: &IdMapper,
    ) -> Formatted {
        let text = post.text.trim();
        if self.classifier.is_blocked(text) {
            return Formatted::Suppressed(SuppressReason::Blocked);
        }

        let mut lines: Vec<String> = Vec::new();
        let mut candidate: Option<PostId> = None;
        let mut seen_link = false;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if is_reply_link(line) {
                if lines.is_empty() && !seen_link {
                    candidate = reply_link(line);
                }
                seen_link = true;
                continue;
            }
            lines.push(escape_line(line));
        }

        let mut body = lines.join("\n");
        if body.is_empty() && !post.has_media() {
            return Formatted::Suppressed(SuppressReason::Empty);
        }

        let mut citation =
            candidate.and_then(|target| self.resolver.resolve(post.id, target, known, ids));
        let reply_to = citation.as_ref().and_then(|c| c.reply_to);

        if body.starts_with('>') {
            // avoid a double quote; a native reply adds no quote text
            citation = None;
        }

        if let Some(c) = &citation {
            if reply_to.is_none() {
                body = format!(">{}\n{}", c.summary, body);
            }
        }

        Formatted::Message(FormattedMessage {
            text: body,
            reply_to,
            citation: citation.map(|c| c.summary),
            media_url: post.media_url.clone(),
        })
    }
}
