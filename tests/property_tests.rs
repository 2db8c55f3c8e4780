//! Property-based tests using proptest.
//!
//! These tests verify invariants that should hold for all inputs,
//! helping catch edge cases that unit tests might miss.

use proptest::prelude::*;
use std::collections::BTreeMap;
use thread_mirror::citation::truncate;
use thread_mirror::escape::{escape, is_reserved};
use thread_mirror::{Formatter, IdMapper, MessageId, Post, PostId, SyncState};

// =============================================================================
// Escaping Properties
// =============================================================================

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

proptest! {
    /// Escaping adds exactly one backslash per reserved character
    #[test]
    fn escape_adds_one_char_per_reserved(text in "[^\\\\]{0,64}") {
        let reserved = text.chars().filter(|c| is_reserved(*c)).count();
        let escaped = escape(&text);
        prop_assert_eq!(escaped.chars().count(), text.chars().count() + reserved);
    }

    /// Removing the backslashes restores the input
    #[test]
    fn escape_is_reversible(text in "[^\\\\]{0,64}") {
        prop_assert_eq!(unescape(&escape(&text)), text);
    }

    /// No reserved character survives unescaped
    #[test]
    fn escape_leaves_no_bare_reserved(text in "[^\\\\]{0,64}") {
        let escaped: Vec<char> = escape(&text).chars().collect();
        for (i, c) in escaped.iter().enumerate() {
            if is_reserved(*c) {
                prop_assert!(i > 0 && escaped[i - 1] == '\\');
            }
        }
    }
}

// =============================================================================
// Truncation Properties
// =============================================================================

proptest! {
    /// Truncated summaries never exceed the limit plus the ellipsis
    #[test]
    fn truncate_bounds_length(text in "\\PC{0,100}", max in 1usize..60) {
        let out = truncate(&text, max);
        let len = text.chars().count();
        if len <= max {
            prop_assert_eq!(out, text);
        } else {
            prop_assert_eq!(out.chars().count(), max + 1);
            prop_assert!(out.ends_with('…'));
        }
    }
}

// =============================================================================
// Watermark Properties
// =============================================================================

proptest! {
    /// The watermark never decreases and ends at the maximum id seen
    #[test]
    fn watermark_is_monotonic(ids in prop::collection::vec(1u64..10_000, 1..100)) {
        let mut state = SyncState::new();
        let mut previous = None;
        for id in &ids {
            state.advance(PostId(*id));
            let current = state.watermark();
            prop_assert!(current >= previous);
            previous = current;
        }
        prop_assert_eq!(state.watermark(), ids.iter().max().map(|m| PostId(*m)));
    }

    /// Merging the same posts twice adds nothing the second time
    #[test]
    fn merge_is_idempotent(ids in prop::collection::btree_set(1u64..1_000, 0..50)) {
        let posts: Vec<Post> = ids.iter().map(|i| Post::new(*i, "x")).collect();
        let mut state = SyncState::new();
        prop_assert_eq!(state.merge(posts.clone()), ids.len());
        prop_assert_eq!(state.merge(posts), 0);
        prop_assert_eq!(state.len(), ids.len());
    }
}

// =============================================================================
// Id Mapping Properties
// =============================================================================

proptest! {
    /// Accepted records form a bijection
    #[test]
    fn id_mapping_stays_injective(
        pairs in prop::collection::vec((1u64..50, 1i64..50), 0..100)
    ) {
        let mut ids = IdMapper::new();
        for (post, message) in &pairs {
            let _ = ids.record(PostId(*post), MessageId(*message));
        }
        for (post, _) in &pairs {
            if let Some(message) = ids.message_for(PostId(*post)) {
                prop_assert_eq!(ids.post_for(message), Some(PostId(*post)));
            }
        }
    }
}

// =============================================================================
// Formatting Properties
// =============================================================================

proptest! {
    /// Formatting arbitrary threads never panics and never yields empty text
    /// for a post without media
    #[test]
    fn format_handles_arbitrary_text(
        texts in prop::collection::vec("(>>[0-9]{1,3}\n)?\\PC{0,40}(\n\\PC{0,20}){0,3}", 1..8)
    ) {
        let known: BTreeMap<PostId, Post> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| (PostId(i as u64 + 1), Post::new(i as u64 + 1, t.clone())))
            .collect();
        let formatter = Formatter::default();
        let ids = IdMapper::new();

        for post in known.values() {
            if let Some(message) = formatter.format(post, &known, &ids).message() {
                prop_assert!(!message.text.is_empty());
            }
        }
    }
}
