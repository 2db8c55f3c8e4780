// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Thread Mirror
//!
//! Mirrors new posts of a polled forum thread into a chat, preserving reply
//! relationships and filtering disallowed content. Replies written in the
//! chat are routed back to the thread as `>>id` replies.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                              thread-mirror                             │
//! │                                                                        │
//! │  ┌──────────┐   ┌──────────────┐   ┌───────────┐   ┌───────────────┐   │
//! │  │  Source  │──►│ SyncState    │──►│ Formatter │──►│     Sink      │   │
//! │  │ (fetch)  │   │ (merge, wm)  │   │ escape    │   │ (deliver)     │   │
//! │  └──────────┘   └──────────────┘   │ classify  │   └───────┬───────┘   │
//! │                                    │ citation  │           │           │
//! │                                    └───────────┘           ▼           │
//! │  ┌──────────┐   ┌──────────────┐                   ┌───────────────┐   │
//! │  │ Outbound │◄──│ relay_reply  │◄──────────────────│   IdMapper    │   │
//! │  │ (post)   │   │ (>>id)       │                   │ post ↔ message│   │
//! │  └──────────┘   └──────────────┘                   └───────────────┘   │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use thread_mirror::ports::{BoxFuture, FetchError, Source};
//! use thread_mirror::{MirrorConfig, MirrorEngine, Post, PostId, ThreadRef};
//!
//! struct HttpSource;
//!
//! impl Source for HttpSource {
//!     fn fetch_all(&self, _thread: &ThreadRef) -> BoxFuture<'_, Vec<Post>, FetchError> {
//!         Box::pin(async { Ok(Vec::new()) })
//!     }
//!
//!     fn fetch_since(&self, _after: PostId) -> BoxFuture<'_, Vec<Post>, FetchError> {
//!         Box::pin(async { Ok(Vec::new()) })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MirrorConfig::for_testing("b", 301234567);
//!     let engine = Arc::new(MirrorEngine::dry_run(config, Arc::new(HttpSource)).expect("valid config"));
//!
//!     engine.start().await.expect("not running yet");
//!     // ... until shutdown
//!     engine.stop().await.expect("running");
//! }
//! ```

pub mod citation;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod escape;
pub mod feed;
pub mod format;
pub mod id_map;
pub mod metrics;
pub mod ports;
pub mod post;

// Re-exports for convenience
pub use citation::{Citation, CitationResolver, Summary};
pub use classifier::{ContentClassifier, Verdict};
pub use config::{MirrorConfig, MirrorSettings, ThreadRef};
pub use engine::{InboundMessage, MirrorEngine, SyncState, TickOutcome, TickPhase, TickReport};
pub use error::{MirrorError, Result};
pub use escape::escape;
pub use format::Formatter;
pub use id_map::IdMapper;
pub use ports::{NoOpSink, Outbound, Sink, Source};
pub use post::{Formatted, FormattedMessage, MessageId, Post, PostId, SuppressReason};
