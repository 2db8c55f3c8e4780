// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bidirectional mapping between source posts and destination messages.
//!
//! Both directions live behind one type so they cannot drift apart. Entries
//! are only added after a successful delivery; they are never removed or
//! overwritten.

use crate::error::{MirrorError, Result};
use crate::post::{MessageId, PostId};
use std::collections::HashMap;

/// Injective `PostId <-> MessageId` mapping.
#[derive(Debug, Default, Clone)]
pub struct IdMapper {
    to_message: HashMap<PostId, MessageId>,
    to_post: HashMap<MessageId, PostId>,
}

impl IdMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `post_id` was delivered as `message_id`.
    ///
    /// Recording the same pair twice is a no-op. If either side is already
    /// mapped to a different counterpart, nothing is inserted and a
    /// [`MirrorError::Consistency`] is returned.
    pub fn record(&mut self, post_id: PostId, message_id: MessageId) -> Result<()> {
        let existing_message = self.to_message.get(&post_id).copied();
        let existing_post = self.to_post.get(&message_id).copied();

        match (existing_message, existing_post) {
            (Some(m), Some(p)) if m == message_id && p == post_id => Ok(()),
            (Some(m), _) if m != message_id => Err(MirrorError::Consistency {
                post_id,
                message_id,
                existing: format!("post already mapped to message {}", m),
            }),
            (_, Some(p)) if p != post_id => Err(MirrorError::Consistency {
                post_id,
                message_id,
                existing: format!("message already mapped to post {}", p),
            }),
            _ => {
                self.to_message.insert(post_id, message_id);
                self.to_post.insert(message_id, post_id);
                Ok(())
            }
        }
    }

    /// Destination message a post was delivered as.
    pub fn message_for(&self, post_id: PostId) -> Option<MessageId> {
        self.to_message.get(&post_id).copied()
    }

    /// Source post a destination message mirrors.
    pub fn post_for(&self, message_id: MessageId) -> Option<PostId> {
        self.to_post.get(&message_id).copied()
    }

    pub fn len(&self) -> usize {
        self.to_message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_message.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup_both_directions() {
        let mut map = IdMapper::new();
        map.record(PostId(10), MessageId(500)).unwrap();

        assert_eq!(map.message_for(PostId(10)), Some(MessageId(500)));
        assert_eq!(map.post_for(MessageId(500)), Some(PostId(10)));
        assert_eq!(map.message_for(PostId(11)), None);
        assert_eq!(map.post_for(MessageId(501)), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_same_pair_is_idempotent() {
        let mut map = IdMapper::new();
        map.record(PostId(1), MessageId(2)).unwrap();
        map.record(PostId(1), MessageId(2)).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_post_conflict_rejected() {
        let mut map = IdMapper::new();
        map.record(PostId(1), MessageId(2)).unwrap();

        let err = map.record(PostId(1), MessageId(3)).unwrap_err();
        assert!(matches!(err, MirrorError::Consistency { .. }));
        // original entry untouched, nothing half-inserted
        assert_eq!(map.message_for(PostId(1)), Some(MessageId(2)));
        assert_eq!(map.post_for(MessageId(3)), None);
    }

    #[test]
    fn test_message_conflict_rejected() {
        let mut map = IdMapper::new();
        map.record(PostId(1), MessageId(2)).unwrap();

        let err = map.record(PostId(9), MessageId(2)).unwrap_err();
        assert!(err.to_string().contains("message already mapped to post 1"));
        assert_eq!(map.message_for(PostId(9)), None);
        assert_eq!(map.post_for(MessageId(2)), Some(PostId(1)));
        assert!(!map.is_empty());
    }
}
