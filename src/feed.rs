// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Decoding of the thread's JSON API into [`Post`]s.
//!
//! The HTTP client lives outside this crate; a [`Source`](crate::ports::Source)
//! implementation fetches the URLs built here and hands the bodies to
//! [`decode_thread`] / [`decode_updates`].
//!
//! # Payloads
//!
//! ```text
//! GET {base}/{board}/res/{thread}.json                   → { "threads": [ { "posts": [...] } ] }
//! GET {base}/api/mobile/v2/after/{board}/{thread}/{n}    → { "posts": [...] }   (ids ≥ n)
//!
//! post = { "num": 123, "comment": "<html>", "timestamp": 1707152583,
//!          "files": [ { "type": 1, "path": "/b/src/.../x.jpg" } ] | null }
//! ```

use crate::config::ThreadRef;
use crate::ports::{FetchError, FetchResult};
use crate::post::{Post, PostId};
use chrono::{Local, TimeZone};
use regex::Regex;
use serde::Deserialize;
use std::fmt::Display;
use std::sync::OnceLock;

/// File types the chat can show inline (JPEG, PNG).
const IMAGE_FILE_TYPES: &[u32] = &[1, 2];

/// Display format for post timestamps, e.g. `Mon 14:03:27`.
pub const TIMESTAMP_FORMAT: &str = "%a %H:%M:%S";

#[derive(Debug, Deserialize)]
struct ThreadSnapshot {
    threads: Vec<ThreadBody>,
}

#[derive(Debug, Deserialize)]
struct ThreadBody {
    posts: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    posts: Vec<RawPost>,
}

/// A post as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub num: u64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub files: Option<Vec<RawFile>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFile {
    #[serde(rename = "type")]
    pub kind: u32,
    pub path: String,
}

/// URL of the full thread snapshot.
pub fn thread_url(thread: &ThreadRef) -> String {
    format!("{}/{}/res/{}.json", thread.base_url, thread.board, thread.thread)
}

/// URL of the posts newer than `after`.
pub fn updates_url(thread: &ThreadRef, after: PostId) -> String {
    format!(
        "{}/api/mobile/v2/after/{}/{}/{}",
        thread.base_url,
        thread.board,
        thread.thread,
        after.0.saturating_add(1)
    )
}

/// Decode a full thread snapshot.
pub fn decode_thread(json: &str, base_url: &str) -> FetchResult<Vec<Post>> {
    let snapshot: ThreadSnapshot =
        serde_json::from_str(json).map_err(|e| FetchError(format!("thread snapshot: {}", e)))?;
    let body = snapshot
        .threads
        .into_iter()
        .next()
        .ok_or_else(|| FetchError("thread snapshot has no threads".into()))?;
    Ok(convert_posts(body.posts, base_url))
}

/// Decode an incremental update.
pub fn decode_updates(json: &str, base_url: &str) -> FetchResult<Vec<Post>> {
    let updates: UpdatesResponse =
        serde_json::from_str(json).map_err(|e| FetchError(format!("thread updates: {}", e)))?;
    Ok(convert_posts(updates.posts, base_url))
}

fn convert_posts(raw: Vec<RawPost>, base_url: &str) -> Vec<Post> {
    let mut posts: Vec<Post> = raw.into_iter().map(|p| convert_post(p, base_url)).collect();
    posts.sort_by_key(|p| p.id);
    posts
}

/// Convert one API post.
pub fn convert_post(raw: RawPost, base_url: &str) -> Post {
    let media_url = raw
        .files
        .as_ref()
        .and_then(|files| files.first())
        .filter(|file| IMAGE_FILE_TYPES.contains(&file.kind))
        .map(|file| format!("{}{}", base_url, file.path));

    Post {
        id: PostId(raw.num),
        text: html_to_text(&raw.comment),
        display_timestamp: format_timestamp(raw.timestamp, &Local),
        media_url,
    }
}

/// Render a unix timestamp in `tz` using [`TIMESTAMP_FORMAT`].
pub fn format_timestamp<Tz: TimeZone>(unix: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    match tz.timestamp_opt(unix, 0).single() {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => String::new(),
    }
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex literal"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex literal"))
}

/// Extract plain text from a post's HTML comment.
///
/// `<br>` becomes a newline, other tags are stripped, then every named and
/// numeric entity is decoded.
pub fn html_to_text(html: &str) -> String {
    let text = line_break_re().replace_all(html, "\n");
    let text = tag_re().replace_all(&text, "");
    html_escape::decode_html_entities(&text).into_owned()
}
