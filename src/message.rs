//! Platform-neutral message model.
//!
//! Adapters translate their native events into these types before handing
//! them to the engine. Ids are opaque strings; mention markup inside
//! `content` follows the `<@id>` convention.

use serde::{Deserialize, Serialize};

// ── Channels ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Text,
    PublicThread,
    PrivateThread,
    Dm,
}

/// The channel a message was posted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    pub kind: ChannelKind,
}

impl ChannelRef {
    pub fn new(id: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// The top-level channel a thread hangs off (or the channel itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseChannel {
    pub id: String,
    pub is_dm: bool,
    /// Whether the default audience (everyone) can view it.
    pub visible_to_everyone: bool,
}

/// A thread found or created on the review surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub id: String,
    pub name: String,
}

// ── Messages ────────────────────────────────────────────────────

/// Pointer to another message, used for explicit replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub channel: ChannelRef,
    pub author_id: String,
    pub content: String,
    /// Ids of users mentioned in `content`.
    #[serde(default)]
    pub mentions: Vec<String>,
    /// Set when the message is an explicit reply.
    #[serde(default)]
    pub reply_to: Option<MessageRef>,
    /// Set when the message is the output of a slash command or other interaction.
    #[serde(default)]
    pub is_interaction: bool,
}

impl ChatMessage {
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|id| id == user_id)
    }
}

// ── Outgoing ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
}

/// A message the bot sends or edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: String,
    pub buttons: Vec<Button>,
}

/// A pinned message in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMessage {
    pub id: String,
    /// Only messages the bot itself authored can be edited.
    pub editable: bool,
}
