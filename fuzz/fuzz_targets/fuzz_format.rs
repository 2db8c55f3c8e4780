//! Fuzz target for post formatting.
//!
//! Builds a small thread from arbitrary text and formats every post against
//! it. Formatting must never panic and must never produce an empty message
//! for a post without media.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;
use thread_mirror::{Formatter, IdMapper, MessageId, Post, PostId};

fuzz_target!(|data: (Vec<&str>, u8)| {
    let (texts, mapped) = data;

    let known: BTreeMap<PostId, Post> = texts
        .iter()
        .take(16)
        .enumerate()
        .map(|(i, t)| (PostId(i as u64 + 1), Post::new(i as u64 + 1, *t)))
        .collect();

    // Map a prefix of the thread so native replies get exercised too.
    let mut ids = IdMapper::new();
    for id in 1..=u64::from(mapped % 8) {
        let _ = ids.record(PostId(id), MessageId(id as i64 + 100));
    }

    let formatter = Formatter::default();
    for post in known.values() {
        if let Some(message) = formatter.format(post, &known, &ids).message() {
            assert!(!message.text.is_empty());
        }
    }
});
