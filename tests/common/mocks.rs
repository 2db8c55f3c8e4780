//! Mock ports for testing.
//!
//! Every mock records its calls for assertions. Responses are configurable so
//! tests can script fetch failures, delivery rejections and posting errors.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use thread_mirror::ports::{
    BoxFuture, DeliveryError, FetchError, FetchResult, Outbound, PostingError, Sink, Source,
};
use thread_mirror::{FormattedMessage, MessageId, Post, PostId, ThreadRef};
use tokio::sync::{Notify, RwLock};

/// A recorded fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    All,
    Since(PostId),
}

/// Mock source replaying queued responses; empty once the queue runs out.
///
/// # Example
/// ```rust,ignore
/// let source = MockSource::new();
/// source.push_posts(vec![Post::new(1, "op")]).await;
/// source.push_error("timeout").await;
/// ```
pub struct MockSource {
    responses: RwLock<VecDeque<FetchResult<Vec<Post>>>>,
    calls: RwLock<Vec<FetchCall>>,
    /// When set, every fetch waits for a permit on this gate.
    gate: Option<Arc<Notify>>,
    /// Notified when a fetch starts (before waiting on the gate).
    entered: Arc<Notify>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(VecDeque::new()),
            calls: RwLock::new(Vec::new()),
            gate: None,
            entered: Arc::new(Notify::new()),
        }
    }

    /// A source whose fetches block until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub async fn push_posts(&self, posts: Vec<Post>) {
        self.responses.write().await.push_back(Ok(posts));
    }

    pub async fn push_error(&self, message: &str) {
        self.responses
            .write()
            .await
            .push_back(Err(FetchError(message.to_string())));
    }

    pub async fn calls(&self) -> Vec<FetchCall> {
        self.calls.read().await.clone()
    }

    /// Wait until a fetch has started.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    fn respond(&self, call: FetchCall) -> BoxFuture<'_, Vec<Post>, FetchError> {
        Box::pin(async move {
            self.calls.write().await.push(call);
            self.entered.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .write()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for MockSource {
    fn fetch_all(&self, _thread: &ThreadRef) -> BoxFuture<'_, Vec<Post>, FetchError> {
        self.respond(FetchCall::All)
    }

    fn fetch_since(&self, after: PostId) -> BoxFuture<'_, Vec<Post>, FetchError> {
        self.respond(FetchCall::Since(after))
    }
}

/// Mock sink recording delivered messages.
///
/// Message ids start at 1000 and increase per successful delivery.
pub struct MockSink {
    delivered: RwLock<Vec<(MessageId, FormattedMessage)>>,
    attempts: AtomicUsize,
    /// 0-based delivery attempts that fail.
    fail_attempts: RwLock<HashSet<usize>>,
    next_id: AtomicI64,
    /// When set, every delivery returns this id.
    fixed_id: Option<MessageId>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            delivered: RwLock::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_attempts: RwLock::new(HashSet::new()),
            next_id: AtomicI64::new(1000),
            fixed_id: None,
        }
    }

    /// A sink that (wrongly) returns the same message id every time.
    pub fn with_fixed_id(id: MessageId) -> Self {
        Self {
            fixed_id: Some(id),
            ..Self::new()
        }
    }

    /// Make the n-th (0-based) delivery attempt fail.
    pub async fn fail_attempt(&self, n: usize) {
        self.fail_attempts.write().await.insert(n);
    }

    pub async fn delivered(&self) -> Vec<(MessageId, FormattedMessage)> {
        self.delivered.read().await.clone()
    }

    pub async fn delivered_texts(&self) -> Vec<String> {
        self.delivered
            .read()
            .await
            .iter()
            .map(|(_, m)| m.text.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MockSink {
    fn deliver(&self, message: &FormattedMessage) -> BoxFuture<'_, MessageId, DeliveryError> {
        let message = message.clone();
        Box::pin(async move {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_attempts.read().await.contains(&attempt) {
                return Err(DeliveryError(format!("rejected attempt {}", attempt)));
            }
            let id = self
                .fixed_id
                .unwrap_or_else(|| MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)));
            self.delivered.write().await.push((id, message));
            Ok(id)
        })
    }
}

/// Mock outbound poster.
pub struct MockOutbound {
    posts: RwLock<Vec<(String, Option<Vec<u8>>)>>,
    fail_with: Option<String>,
}

impl MockOutbound {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub async fn posts(&self) -> Vec<(String, Option<Vec<u8>>)> {
        self.posts.read().await.clone()
    }
}

impl Default for MockOutbound {
    fn default() -> Self {
        Self::new()
    }
}

impl Outbound for MockOutbound {
    fn post(&self, text: &str, attachment: Option<Vec<u8>>) -> BoxFuture<'_, (), PostingError> {
        let text = text.to_string();
        Box::pin(async move {
            if let Some(message) = &self.fail_with {
                return Err(PostingError(message.clone()));
            }
            self.posts.write().await.push((text, attachment));
            Ok(())
        })
    }
}

/// Posts `first..=last` with text `"post {id}"`.
#[allow(dead_code)] // not every test binary uses it
pub fn numbered_posts(first: u64, last: u64) -> Vec<Post> {
    (first..=last).map(|i| Post::new(i, format!("post {}", i))).collect()
}
