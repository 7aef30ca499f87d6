//! The chat engine: one object owning the corpus and routing messages.
//!
//! Messages in the review thread go to the responder; everything else goes
//! to the learner. The corpus and its exclusion set sit behind a single
//! `RwLock`, so learning and redaction never interleave and matching only
//! ever reads.

use std::sync::Arc;
use std::time::Duration;

use echo_corpus::{Corpus, CorpusEntry};
use parking_lot::Mutex as SyncMutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::consent;
use crate::error::{ChatError, Result};
use crate::last_message::{LastMessageCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::learner::Learner;
use crate::message::ChatMessage;
use crate::redactor::{RedactOutcome, RedactRequest, Redactor};
use crate::responder;
use crate::review::{chat_name, ensure_review_thread};
use crate::traits::{AuditSink, ChatPlatform, CorpusStore, SettingsStore};

/// Injected collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub platform: Arc<dyn ChatPlatform>,
    pub settings: Arc<dyn SettingsStore>,
    pub store: Arc<dyn CorpusStore>,
    pub audit: Arc<dyn AuditSink>,
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub bot_name: String,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    /// Fixed seed for reply shuffling; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            bot_name: "Echo".to_string(),
            cache_capacity: DEFAULT_CAPACITY,
            cache_ttl: DEFAULT_TTL,
            seed: None,
        }
    }
}

/// What the engine did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Reply(String),
    Learned(CorpusEntry),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    pub entries: usize,
    pub excluded: usize,
}

pub struct ChatEngine {
    platform: Arc<dyn ChatPlatform>,
    settings: Arc<dyn SettingsStore>,
    store: Arc<dyn CorpusStore>,
    corpus: RwLock<Corpus>,
    last_messages: LastMessageCache,
    rng: SyncMutex<StdRng>,
    learner: Learner,
    redactor: Redactor,
    bot_name: String,
    review_thread: Option<String>,
}

impl ChatEngine {
    pub fn new(collaborators: Collaborators, options: EngineOptions) -> Self {
        let Collaborators {
            platform,
            settings,
            store,
            audit,
        } = collaborators;

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            learner: Learner::new(platform.clone(), settings.clone(), store.clone()),
            redactor: Redactor::new(store.clone(), audit, chat_name(&options.bot_name)),
            platform,
            settings,
            store,
            corpus: RwLock::new(Corpus::new()),
            last_messages: LastMessageCache::new(options.cache_capacity, options.cache_ttl),
            rng: SyncMutex::new(rng),
            bot_name: options.bot_name,
            review_thread: None,
        }
    }

    /// Hydrate the in-memory corpus from the durable store.
    pub async fn load(&self) -> Result<usize> {
        let excluded = self
            .store
            .load_exclusions()
            .await
            .map_err(ChatError::Store)?;
        let entries = self.store.load_all().await.map_err(ChatError::Store)?;

        let corpus = Corpus::from_parts(entries, excluded);
        let count = corpus.len();
        info!(
            "Loaded {} corpus entries ({} excluded responses)",
            count,
            corpus.excluded().len()
        );
        *self.corpus.write().await = corpus;
        Ok(count)
    }

    /// Find or create the review thread under `parent_channel`.
    pub async fn bootstrap_review(&mut self, parent_channel: Option<&str>) -> Result<Option<&str>> {
        self.review_thread =
            ensure_review_thread(self.platform.as_ref(), parent_channel, &self.bot_name).await?;
        Ok(self.review_thread.as_deref())
    }

    /// Use an already known review thread.
    pub fn set_review_thread(&mut self, thread_id: Option<String>) {
        self.review_thread = thread_id;
    }

    pub fn review_thread(&self) -> Option<&str> {
        self.review_thread.as_deref()
    }

    pub async fn on_message(&self, message: &ChatMessage) -> Reaction {
        if self.review_thread.as_deref() == Some(message.channel.id.as_str()) {
            return match self.respond(message).await {
                Some(reply) => Reaction::Reply(reply),
                None => Reaction::Ignored,
            };
        }

        let previous = self.last_messages.swap(message);
        match self.learner.observe(&self.corpus, message, previous).await {
            Some(entry) => Reaction::Learned(entry),
            None => Reaction::Ignored,
        }
    }

    /// Reply to a review thread message, if it is addressed to the bot and
    /// anything in the corpus is close enough.
    pub async fn respond(&self, message: &ChatMessage) -> Option<String> {
        let bot_id = self.platform.bot_id();
        if !responder::is_addressed(message, bot_id) {
            debug!(message = %message.id, "Not addressed to the bot");
            return None;
        }

        let corpus = self.corpus.read().await;
        let mut rng = self.rng.lock();
        responder::respond(&corpus, message, bot_id, &mut *rng)
    }

    pub async fn redact(&self, request: RedactRequest<'_>) -> Result<RedactOutcome> {
        self.redactor
            .redact(&self.corpus, self.platform.as_ref(), request)
            .await
    }

    pub async fn redact_response(&self, response: &str, invoker_id: &str) -> Result<RedactOutcome> {
        self.redactor
            .redact_response(&self.corpus, response, invoker_id)
            .await
    }

    /// Handle a consent button press; `None` if the button isn't ours.
    pub async fn handle_button(&self, custom_id: &str, user_id: &str) -> Result<Option<String>> {
        consent::handle_button(self.settings.as_ref(), custom_id, user_id).await
    }

    pub async fn stats(&self) -> CorpusStats {
        let corpus = self.corpus.read().await;
        CorpusStats {
            entries: corpus.len(),
            excluded: corpus.excluded().len(),
        }
    }

    /// Copy of every in-memory pair.
    pub async fn snapshot(&self) -> Vec<CorpusEntry> {
        self.corpus.read().await.entries().to_vec()
    }

    pub fn learner(&self) -> &Learner {
        &self.learner
    }
}
