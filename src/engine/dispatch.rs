// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Dispatch: format, deliver, record, advance.
//!
//! ```text
//! fetched ──► select_batch (≤ cap, highest ids, ascending)
//!                  │
//!                  ▼  for each post, strictly in order
//!            format ──Suppressed──────────────┐
//!                  │ Message                  │
//!                  ▼                          │
//!            sink.deliver ──Err (logged)──────┤
//!                  │ Ok(message_id)           │
//!                  ▼                          │
//!            ids.record(post, message)        │
//!                  │                          │
//!                  ▼                          ▼
//!            watermark = max(watermark, post.id)
//! ```

use super::{MirrorEngine, TickReport};
use crate::error::MirrorError;
use crate::metrics;
use crate::ports::{Sink, Source};
use crate::post::{Formatted, Post};
use tracing::{debug, warn};

/// Order `posts` by id and keep at most `cap` of the highest ids.
///
/// Returns the batch in ascending order and how many older posts were dropped.
/// Duplicate ids in the input are collapsed.
pub fn select_batch(mut posts: Vec<Post>, cap: usize) -> (Vec<Post>, usize) {
    posts.sort_by_key(|p| p.id);
    posts.dedup_by_key(|p| p.id);
    let overflow = posts.len().saturating_sub(cap);
    if overflow > 0 {
        posts.drain(..overflow);
    }
    (posts, overflow)
}

impl<S: Source, K: Sink> MirrorEngine<S, K> {
    /// Deliver `batch` in order, advancing the watermark past every post.
    pub(super) async fn dispatch(&self, batch: Vec<Post>, report: &mut TickReport) {
        for post in batch {
            let formatted = {
                let inner = self.inner.lock().await;
                self.formatter
                    .format(&post, inner.sync.known_posts(), &inner.ids)
            };

            match formatted {
                Formatted::Suppressed(reason) => {
                    debug!(post_id = %post.id, reason = reason.as_str(), "Post suppressed");
                    metrics::record_suppressed(reason.as_str());
                    report.suppressed += 1;
                }
                Formatted::Message(message) => match self.sink.deliver(&message).await {
                    Ok(message_id) => {
                        report.delivered += 1;
                        metrics::record_delivered(message.reply_to.is_some());
                        let recorded = self.inner.lock().await.ids.record(post.id, message_id);
                        if let Err(e) = recorded {
                            warn!(post_id = %post.id, message_id = %message_id, error = %e, "Mapping not recorded");
                            metrics::record_mapping_conflict();
                            metrics::record_error(e.kind(), e.is_retryable());
                            report.mapping_conflicts += 1;
                        } else {
                            debug!(post_id = %post.id, message_id = %message_id, "Delivered");
                        }
                    }
                    Err(e) => {
                        // The watermark still moves past this post: it is not retried.
                        let err = MirrorError::delivery(post.id, e);
                        warn!(error = %err, "Could not deliver message");
                        metrics::record_delivery_failure();
                        metrics::record_error(err.kind(), err.is_retryable());
                        report.failed += 1;
                    }
                },
            }

            let mut inner = self.inner.lock().await;
            inner.sync.advance(post.id);
            report.watermark = inner.sync.watermark();
            if let Some(watermark) = report.watermark {
                metrics::set_watermark(watermark.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::PostId;

    fn ids(posts: &[Post]) -> Vec<u64> {
        posts.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_select_batch_under_cap() {
        let (batch, overflow) = select_batch(vec![Post::new(3, "c"), Post::new(1, "a")], 50);
        assert_eq!(ids(&batch), vec![1, 3]);
        assert_eq!(overflow, 0);
    }

    #[test]
    fn test_select_batch_keeps_highest_ids() {
        let posts: Vec<Post> = (1..=60).rev().map(|i| Post::new(i, "x")).collect();
        let (batch, overflow) = select_batch(posts, 50);
        assert_eq!(overflow, 10);
        assert_eq!(batch.len(), 50);
        assert_eq!(batch.first().map(|p| p.id), Some(PostId(11)));
        assert_eq!(batch.last().map(|p| p.id), Some(PostId(60)));
    }

    #[test]
    fn test_select_batch_collapses_duplicates() {
        let (batch, overflow) =
            select_batch(vec![Post::new(2, "b"), Post::new(2, "b"), Post::new(1, "a")], 2);
        assert_eq!(ids(&batch), vec![1, 2]);
        assert_eq!(overflow, 0);
    }
}
