#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use echo_corpus::{CorpusEntry, ExclusionSet, SqliteCorpusStore};
use echoclaw::audit::AuditRecord;
use echoclaw::message::{
    BaseChannel, ChannelKind, ChannelRef, ChatMessage, MessageRef, OutgoingMessage,
    PinnedMessage, ThreadRef,
};
use echoclaw::traits::{AuditSink, ChatPlatform, CorpusStore, SettingsStore};
use echoclaw::{ChatEngine, Collaborators, EngineOptions};

pub const BOT: &str = "900";
pub const REVIEW_THREAD: &str = "review";

// ── Platform ──

#[derive(Default)]
pub struct FakePlatform {
    pub messages: Mutex<HashMap<String, ChatMessage>>,
    pub channels: Mutex<HashMap<String, BaseChannel>>,
    pub can_delete: AtomicBool,
    pub deleted: Mutex<Vec<String>>,
    pub threads: Mutex<Vec<ThreadRef>>,
    pub pinned: Mutex<HashMap<String, Vec<PinnedMessage>>>,
    pub sent: Mutex<Vec<(String, OutgoingMessage)>>,
    pub edited: Mutex<Vec<(String, String)>>,
    pub pins: Mutex<Vec<(String, String)>>,
    pub renamed: Mutex<Vec<(String, String)>>,
    pub created: Mutex<Vec<(String, String, String)>>,
    next_id: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Self {
        let platform = Self::default();
        platform.can_delete.store(true, Ordering::SeqCst);
        for (id, visible) in [("general", true), ("staff", false)] {
            platform.channels.lock().insert(
                id.to_string(),
                BaseChannel {
                    id: id.to_string(),
                    is_dm: false,
                    visible_to_everyone: visible,
                },
            );
        }
        platform.channels.lock().insert(
            "dm".to_string(),
            BaseChannel {
                id: "dm".to_string(),
                is_dm: true,
                visible_to_everyone: false,
            },
        );
        platform
    }

    /// Make a message fetchable as a reply reference.
    pub fn remember(&self, message: &ChatMessage) {
        self.messages
            .lock()
            .insert(message.id.clone(), message.clone());
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn bot_id(&self) -> &str {
        BOT
    }

    async fn fetch_reference(&self, reference: &MessageRef) -> Result<ChatMessage> {
        match self.messages.lock().get(&reference.message_id) {
            Some(message) => Ok(message.clone()),
            None => bail!("unknown message {}", reference.message_id),
        }
    }

    async fn base_channel(&self, channel: &ChannelRef) -> Option<BaseChannel> {
        self.channels.lock().get(&channel.id).cloned()
    }

    async fn delete_message(&self, message: &ChatMessage) -> Result<bool> {
        if !self.can_delete.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.deleted.lock().push(message.id.clone());
        Ok(true)
    }

    async fn find_thread(&self, _parent: &str, prefix: &str) -> Result<Option<ThreadRef>> {
        Ok(self
            .threads
            .lock()
            .iter()
            .find(|t| t.name.starts_with(prefix))
            .cloned())
    }

    async fn create_thread(&self, parent: &str, name: &str, reason: &str) -> Result<ThreadRef> {
        let thread = ThreadRef {
            id: format!("thread-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: name.to_string(),
        };
        self.threads.lock().push(thread.clone());
        self.created
            .lock()
            .push((parent.to_string(), name.to_string(), reason.to_string()));
        Ok(thread)
    }

    async fn rename_thread(&self, thread_id: &str, name: &str) -> Result<()> {
        self.renamed
            .lock()
            .push((thread_id.to_string(), name.to_string()));
        Ok(())
    }

    async fn pinned_messages(&self, channel_id: &str) -> Result<Vec<PinnedMessage>> {
        Ok(self
            .pinned
            .lock()
            .get(channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send(&self, channel_id: &str, message: &OutgoingMessage) -> Result<String> {
        self.sent
            .lock()
            .push((channel_id.to_string(), message.clone()));
        Ok(format!("msg-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit(
        &self,
        channel_id: &str,
        message_id: &str,
        _message: &OutgoingMessage,
    ) -> Result<()> {
        self.edited
            .lock()
            .push((channel_id.to_string(), message_id.to_string()));
        Ok(())
    }

    async fn pin(&self, channel_id: &str, message_id: &str, _reason: &str) -> Result<()> {
        self.pins
            .lock()
            .push((channel_id.to_string(), message_id.to_string()));
        Ok(())
    }
}

// ── Settings ──

#[derive(Default)]
pub struct MemorySettings {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn consenting(users: &[&str]) -> Self {
        let settings = Self::default();
        for user in users {
            settings.flags.lock().insert(user.to_string(), true);
        }
        settings
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn consent(&self, user_id: &str) -> Result<bool> {
        Ok(self.flags.lock().get(user_id).copied().unwrap_or(false))
    }

    async fn set_consent(&self, user_id: &str, allowed: bool) -> Result<()> {
        self.flags.lock().insert(user_id.to_string(), allowed);
        Ok(())
    }
}

// ── Corpus store ──

/// SQLite store whose appends can be made to fail.
pub struct FlakyStore {
    pub inner: SqliteCorpusStore,
    pub fail_appends: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteCorpusStore::open_in_memory().unwrap(),
            fail_appends: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CorpusStore for FlakyStore {
    async fn append(&self, entry: &CorpusEntry) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        Ok(self.inner.append(entry)?)
    }

    async fn delete_by_response(&self, response: &str) -> Result<usize> {
        Ok(self.inner.delete_by_response(response)?)
    }

    async fn load_all(&self) -> Result<Vec<CorpusEntry>> {
        Ok(self.inner.load_all()?)
    }

    async fn record_exclusion(&self, response: &str) -> Result<()> {
        Ok(self.inner.record_exclusion(response)?)
    }

    async fn load_exclusions(&self) -> Result<ExclusionSet> {
        Ok(self.inner.load_exclusions()?)
    }
}

// ── Audit ──

#[derive(Default)]
pub struct RecordingAudit {
    pub records: Mutex<Vec<AuditRecord>>,
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn log(&self, record: AuditRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }
}

// ── Harness ──

pub struct Harness {
    pub engine: ChatEngine,
    pub platform: Arc<FakePlatform>,
    pub settings: Arc<MemorySettings>,
    pub store: Arc<FlakyStore>,
    pub audit: Arc<RecordingAudit>,
}

impl Harness {
    pub fn new(consenting: &[&str]) -> Self {
        Self::with_store(consenting, Arc::new(FlakyStore::new()))
    }

    pub fn with_store(consenting: &[&str], store: Arc<FlakyStore>) -> Self {
        Self::build(consenting, store, EngineOptions::default())
    }

    pub fn with_options(consenting: &[&str], options: EngineOptions) -> Self {
        Self::build(consenting, Arc::new(FlakyStore::new()), options)
    }

    fn build(consenting: &[&str], store: Arc<FlakyStore>, options: EngineOptions) -> Self {
        let platform = Arc::new(FakePlatform::new());
        let settings = Arc::new(MemorySettings::consenting(consenting));
        let audit = Arc::new(RecordingAudit::default());

        let mut engine = ChatEngine::new(
            Collaborators {
                platform: platform.clone(),
                settings: settings.clone(),
                store: store.clone(),
                audit: audit.clone(),
            },
            EngineOptions {
                seed: Some(7),
                ..options
            },
        );
        engine.set_review_thread(Some(REVIEW_THREAD.to_string()));

        Self {
            engine,
            platform,
            settings,
            store,
            audit,
        }
    }
}

// ── Messages ──

pub fn msg(id: &str, channel: &str, author: &str, content: &str) -> ChatMessage {
    let kind = if channel == REVIEW_THREAD {
        ChannelKind::PublicThread
    } else if channel == "dm" {
        ChannelKind::Dm
    } else {
        ChannelKind::Text
    };
    ChatMessage {
        id: id.to_string(),
        channel: ChannelRef::new(channel, kind),
        author_id: author.to_string(),
        content: content.to_string(),
        mentions: vec![],
        reply_to: None,
        is_interaction: false,
    }
}

pub fn mentioning(mut message: ChatMessage, users: &[&str]) -> ChatMessage {
    message.mentions = users.iter().map(|u| u.to_string()).collect();
    message
}

pub fn replying_to(mut message: ChatMessage, target: &ChatMessage) -> ChatMessage {
    message.reply_to = Some(MessageRef {
        channel_id: target.channel.id.clone(),
        message_id: target.id.clone(),
    });
    message
}
