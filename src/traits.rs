//! Collaborator interfaces the engine depends on.
//!
//! The chat platform, the per-user settings store, the durable corpus and
//! the audit sink are all injected behind these traits so the engine can
//! run against SQLite in production and in-memory fakes in tests.

use anyhow::Result;
use async_trait::async_trait;
use echo_corpus::{CorpusEntry, ExclusionSet, SqliteCorpusStore};

use crate::audit::AuditRecord;
use crate::message::{
    BaseChannel, ChannelRef, ChatMessage, MessageRef, OutgoingMessage, PinnedMessage, ThreadRef,
};

// ── Chat platform ──

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// User id of the bot itself.
    fn bot_id(&self) -> &str;

    /// Fetch the message an explicit reply points at.
    async fn fetch_reference(&self, reference: &MessageRef) -> Result<ChatMessage>;

    /// Resolve the top-level channel, or `None` if it cannot be resolved.
    async fn base_channel(&self, channel: &ChannelRef) -> Option<BaseChannel>;

    /// Delete a message. `Ok(false)` when the bot lacks permission.
    async fn delete_message(&self, message: &ChatMessage) -> Result<bool>;

    /// First thread under `parent` whose name starts with `prefix`.
    async fn find_thread(&self, parent: &str, prefix: &str) -> Result<Option<ThreadRef>>;

    async fn create_thread(&self, parent: &str, name: &str, reason: &str) -> Result<ThreadRef>;

    async fn rename_thread(&self, thread_id: &str, name: &str) -> Result<()>;

    async fn pinned_messages(&self, channel_id: &str) -> Result<Vec<PinnedMessage>>;

    /// Send a message, returning its id.
    async fn send(&self, channel_id: &str, message: &OutgoingMessage) -> Result<String>;

    async fn edit(&self, channel_id: &str, message_id: &str, message: &OutgoingMessage)
        -> Result<()>;

    async fn pin(&self, channel_id: &str, message_id: &str, reason: &str) -> Result<()>;
}

// ── Settings ──

/// Per-user boolean settings. Only the chat learning consent flag is used.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Consent flag; `false` for users never seen.
    async fn consent(&self, user_id: &str) -> Result<bool>;

    async fn set_consent(&self, user_id: &str, allowed: bool) -> Result<()>;
}

// ── Corpus persistence ──

#[async_trait]
pub trait CorpusStore: Send + Sync {
    async fn append(&self, entry: &CorpusEntry) -> Result<()>;

    /// Delete every pair with exactly this response, returning how many went.
    async fn delete_by_response(&self, response: &str) -> Result<usize>;

    async fn load_all(&self) -> Result<Vec<CorpusEntry>>;

    async fn record_exclusion(&self, response: &str) -> Result<()>;

    async fn load_exclusions(&self) -> Result<ExclusionSet>;
}

#[async_trait]
impl CorpusStore for SqliteCorpusStore {
    async fn append(&self, entry: &CorpusEntry) -> Result<()> {
        Ok(SqliteCorpusStore::append(self, entry)?)
    }

    async fn delete_by_response(&self, response: &str) -> Result<usize> {
        Ok(SqliteCorpusStore::delete_by_response(self, response)?)
    }

    async fn load_all(&self) -> Result<Vec<CorpusEntry>> {
        Ok(SqliteCorpusStore::load_all(self)?)
    }

    async fn record_exclusion(&self, response: &str) -> Result<()> {
        Ok(SqliteCorpusStore::record_exclusion(self, response)?)
    }

    async fn load_exclusions(&self) -> Result<ExclusionSet> {
        Ok(SqliteCorpusStore::load_exclusions(self)?)
    }
}

// ── Audit ──

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log(&self, record: AuditRecord) -> Result<()>;
}
