//! Fuzz target for thread JSON decoding.
//!
//! Arbitrary text must decode to an error or to posts sorted by id, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use thread_mirror::feed::{decode_thread, decode_updates};

fuzz_target!(|data: &str| {
    if let Ok(posts) = decode_thread(data, "https://2ch.hk") {
        assert!(posts.windows(2).all(|w| w[0].id <= w[1].id));
    }
    let _ = decode_updates(data, "https://2ch.hk");
});
