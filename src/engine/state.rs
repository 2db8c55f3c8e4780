// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory synchronization state.
//!
//! ## Watermark Semantics
//!
//! The watermark is the highest post id already processed. It starts unset
//! (the first fetch pulls the whole thread), only ever moves forward, and
//! advances past every post that went through dispatch, whether it was
//! delivered, suppressed or rejected by the sink.
//!
//! ```text
//! fetch since 1233 → 1234 blocked → watermark 1234
//!                  → 1235 sink error → watermark 1235 (message lost)
//! ```

use crate::post::{Post, PostId};
use std::collections::BTreeMap;

/// Watermark plus every post seen so far.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    watermark: Option<PostId>,
    known_posts: BTreeMap<PostId, Post>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watermark(&self) -> Option<PostId> {
        self.watermark
    }

    /// All known posts, ordered by id.
    pub fn known_posts(&self) -> &BTreeMap<PostId, Post> {
        &self.known_posts
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.known_posts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.known_posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_posts.is_empty()
    }

    /// Union `posts` into the store. Returns how many ids were new.
    pub fn merge<I>(&mut self, posts: I) -> usize
    where
        I: IntoIterator<Item = Post>,
    {
        let mut added = 0;
        for post in posts {
            if self.known_posts.insert(post.id, post).is_none() {
                added += 1;
            }
        }
        added
    }

    /// Whether `id` is already behind the watermark.
    pub fn is_processed(&self, id: PostId) -> bool {
        self.watermark.is_some_and(|w| id <= w)
    }

    /// Move the watermark to `id` if that is forward. Returns whether it moved.
    pub fn advance(&mut self, id: PostId) -> bool {
        if self.is_processed(id) {
            return false;
        }
        self.watermark = Some(id);
        true
    }
}
