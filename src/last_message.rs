//! Most recent message per channel.
//!
//! The previous message in a channel is the implicit prompt for a message
//! that is not an explicit reply. Only the newest message per channel is
//! kept and the number of channels is bounded by an LRU. A cached message
//! older than the freshness window is still reported, marked stale, so
//! callers can check who wrote it without using it as a prompt.

use lru::LruCache;
use parking_lot::Mutex as SyncMutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::message::ChatMessage;

/// Default number of channels tracked.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default freshness window for the implicit prompt.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// The message a newer one displaced.
#[derive(Debug, Clone)]
pub struct Predecessor {
    pub message: ChatMessage,
    pub age: Duration,
    /// Within the freshness window.
    pub fresh: bool,
}

impl Predecessor {
    /// The message, if it may still serve as an implicit prompt.
    pub fn into_fresh(self) -> Option<ChatMessage> {
        self.fresh.then_some(self.message)
    }
}

pub struct LastMessageCache {
    inner: SyncMutex<LruCache<String, (Instant, ChatMessage)>>,
    ttl: Duration,
}

impl LastMessageCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: SyncMutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Record `message` as the newest in its channel and return the one it
    /// replaced.
    pub fn swap(&self, message: &ChatMessage) -> Option<Predecessor> {
        let now = Instant::now();
        let previous = self
            .inner
            .lock()
            .put(message.channel.id.clone(), (now, message.clone()));

        previous.map(|(at, message)| {
            let age = now.duration_since(at);
            Predecessor {
                message,
                age,
                fresh: age < self.ttl,
            }
        })
    }

    /// Number of channels currently tracked.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for LastMessageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
