//! Chat learning consent: the settings store and the opt-in/opt-out flow.
//!
//! Nobody's messages are learned until they press the allow button on the
//! pinned consent prompt. The flag lives in a small SQLite table; unknown
//! users read as not consented.

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{ChatError, Result};
use crate::message::{Button, ButtonStyle, OutgoingMessage};
use crate::traits::SettingsStore;

pub const ALLOW_BUTTON_ID: &str = "_allowChat";
pub const DENY_BUTTON_ID: &str = "_denyChat";

// ── Settings store ──────────────────────────────────────────────

/// SQLite-backed per-user settings.
pub struct SqliteSettings {
    conn: SyncMutex<Connection>,
}

impl SqliteSettings {
    pub fn open(path: &Path) -> AnyResult<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open settings DB: {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> AnyResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> AnyResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             CREATE TABLE IF NOT EXISTS user_settings (
                user_id      TEXT PRIMARY KEY,
                chat_consent INTEGER NOT NULL DEFAULT 0,
                updated_at   INTEGER NOT NULL
            );",
        )?;
        Ok(Self {
            conn: SyncMutex::new(conn),
        })
    }
}

#[async_trait]
impl SettingsStore for SqliteSettings {
    async fn consent(&self, user_id: &str) -> AnyResult<bool> {
        let conn = self.conn.lock();
        let flag = conn
            .query_row(
                "SELECT chat_consent FROM user_settings WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(flag.is_some_and(|f| f != 0))
    }

    async fn set_consent(&self, user_id: &str, allowed: bool) -> AnyResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO user_settings (user_id, chat_consent, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET chat_consent = ?2, updated_at = ?3",
            params![user_id, allowed as i64, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

// ── Flow ────────────────────────────────────────────────────────

/// Result of pressing a consent button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentChange {
    AlreadyAllowed,
    NowAllowed,
    AlreadyDenied,
    NowDenied,
}

impl ConsentChange {
    /// Acknowledgement shown to the user who pressed the button.
    pub fn reply_text(&self, user_id: &str) -> String {
        match self {
            Self::AlreadyAllowed => format!(
                "<@{user_id}>, your messages will continue to be saved in all public channels."
            ),
            Self::NowAllowed => format!(
                "<@{user_id}>, your messages may be saved in all public channels. \
                 If you ever reverse this decision, messages can't be retroactively removed. \
                 If you disagree with these terms, please select the other button on the pinned message."
            ),
            Self::AlreadyDenied => {
                format!("<@{user_id}>, your messages will continue to not be saved.")
            }
            Self::NowDenied => format!(
                "<@{user_id}>, your messages will no longer be saved. \
                 Remember that any past messages will not be retroactively removed."
            ),
        }
    }
}

pub async fn allow(settings: &dyn SettingsStore, user_id: &str) -> Result<ConsentChange> {
    set(settings, user_id, true).await
}

pub async fn deny(settings: &dyn SettingsStore, user_id: &str) -> Result<ConsentChange> {
    set(settings, user_id, false).await
}

async fn set(settings: &dyn SettingsStore, user_id: &str, allowed: bool) -> Result<ConsentChange> {
    let current = settings
        .consent(user_id)
        .await
        .map_err(ChatError::Settings)?;

    if current == allowed {
        return Ok(if allowed {
            ConsentChange::AlreadyAllowed
        } else {
            ConsentChange::AlreadyDenied
        });
    }

    settings
        .set_consent(user_id, allowed)
        .await
        .map_err(ChatError::Settings)?;
    tracing::info!(user = %user_id, allowed, "Chat consent changed");

    Ok(if allowed {
        ConsentChange::NowAllowed
    } else {
        ConsentChange::NowDenied
    })
}

/// Dispatch a button press. `None` for buttons that aren't ours.
pub async fn handle_button(
    settings: &dyn SettingsStore,
    custom_id: &str,
    user_id: &str,
) -> Result<Option<String>> {
    let change = match custom_id {
        ALLOW_BUTTON_ID => allow(settings, user_id).await?,
        DENY_BUTTON_ID => deny(settings, user_id).await?,
        _ => return Ok(None),
    };
    Ok(Some(change.reply_text(user_id)))
}

/// The pinned prompt explaining what is stored, with the two buttons.
pub fn consent_prompt(chat_name: &str) -> OutgoingMessage {
    OutgoingMessage {
        content: format!(
            "## {chat_name}\n\
             ### Basic regurgitating chatbot\n\
             {chat_name} learns by tracking messages across all channels. \
             Your messages will only be stored if you give explicit permission by selecting a button below. \
             You will be able to change your decision at any time, however any past messages can't be deleted, \
             as message authors are not stored. By default, your messages are not saved. \
             If you consent to these terms, you may select the appropriate button below."
        ),
        buttons: vec![
            Button {
                custom_id: ALLOW_BUTTON_ID.to_string(),
                label: "Store my messages".to_string(),
                style: ButtonStyle::Success,
            },
            Button {
                custom_id: DENY_BUTTON_ID.to_string(),
                label: "Don't store my messages".to_string(),
                style: ButtonStyle::Danger,
            },
        ],
    }
}
