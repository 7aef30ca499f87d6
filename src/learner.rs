//! Harvests `(prompt, response)` pairs from ordinary conversation.
//!
//! A message becomes a response when its author consented, it was posted
//! somewhere everyone can read, and it passes the content checks. Its
//! prompt is the message it replies to, or else the previous message in
//! the same channel. Every rejection is a silent skip logged at debug.

use std::fmt;
use std::sync::Arc;

use echo_core::{canonicalize_mentions, log_flags, normalize, ContentFilter};
use echo_corpus::{Corpus, CorpusEntry};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::last_message::Predecessor;
use crate::message::{ChannelKind, ChatMessage};
use crate::traits::{ChatPlatform, CorpusStore, SettingsStore};

/// Longest response kept, in characters.
pub const MAX_RESPONSE_CHARS: usize = 500;

/// Most lines a response may span.
pub const MAX_RESPONSE_LINES: usize = 5;

/// Why a message was not learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Interaction,
    BotAuthor,
    BotPrompt,
    NoConsent,
    PrivateThread,
    NoBaseChannel,
    DirectMessage,
    HiddenChannel,
    EmptyResponse,
    TooLong,
    TooManyLines,
    InviteLink,
    Excluded,
    ReferenceUnavailable,
    NoPrompt,
    SelfReply,
    Echo,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Interaction => "interaction response",
            Self::BotAuthor => "authored by the bot",
            Self::BotPrompt => "previous message is the bot's",
            Self::NoConsent => "author has not consented",
            Self::PrivateThread => "private thread",
            Self::NoBaseChannel => "base channel unresolvable",
            Self::DirectMessage => "direct message",
            Self::HiddenChannel => "channel not visible to everyone",
            Self::EmptyResponse => "empty response",
            Self::TooLong => "response too long",
            Self::TooManyLines => "response has too many lines",
            Self::InviteLink => "response contains an invite",
            Self::Excluded => "response was redacted",
            Self::ReferenceUnavailable => "replied-to message could not be fetched",
            Self::NoPrompt => "no prompt to pair with",
            Self::SelfReply => "prompt has the same author",
            Self::Echo => "prompt equals response",
        };
        f.write_str(reason)
    }
}

pub struct Learner {
    platform: Arc<dyn ChatPlatform>,
    settings: Arc<dyn SettingsStore>,
    store: Arc<dyn CorpusStore>,
    filter: ContentFilter,
}

impl Learner {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        settings: Arc<dyn SettingsStore>,
        store: Arc<dyn CorpusStore>,
    ) -> Self {
        Self {
            platform,
            settings,
            store,
            filter: ContentFilter::new(),
        }
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Observe one message. `previous` is the message that preceded it in
    /// the same channel, stale or not; the caller has already recorded
    /// `message` as the channel's newest. Only a fresh predecessor serves as
    /// the implicit prompt.
    ///
    /// On success the pair is matchable immediately. The durable write
    /// happens afterwards; if it fails the pair stays in memory only.
    pub async fn observe(
        &self,
        corpus: &RwLock<Corpus>,
        message: &ChatMessage,
        previous: Option<Predecessor>,
    ) -> Option<CorpusEntry> {
        match self.try_learn(corpus, message, previous).await {
            Ok(entry) => {
                info!(
                    channel = %message.channel.id,
                    "Learned response ({} chars)",
                    entry.response.chars().count()
                );
                if let Err(e) = self.store.append(&entry).await {
                    warn!("Failed to persist learned pair: {e:#}");
                }
                Some(entry)
            }
            Err(reason) => {
                debug!(message = %message.id, "Not learned: {reason}");
                None
            }
        }
    }

    async fn try_learn(
        &self,
        corpus: &RwLock<Corpus>,
        message: &ChatMessage,
        previous: Option<Predecessor>,
    ) -> Result<CorpusEntry, Rejection> {
        let bot_id = self.platform.bot_id();

        if message.is_interaction {
            return Err(Rejection::Interaction);
        }
        if message.author_id == bot_id {
            return Err(Rejection::BotAuthor);
        }
        if previous
            .as_ref()
            .is_some_and(|p| p.message.author_id == bot_id)
        {
            return Err(Rejection::BotPrompt);
        }

        let consented = match self.settings.consent(&message.author_id).await {
            Ok(consented) => consented,
            Err(e) => {
                warn!("Failed to read consent for {}: {e:#}", message.author_id);
                false
            }
        };
        if !consented {
            return Err(Rejection::NoConsent);
        }

        self.check_surface(message).await?;

        let response = candidate_response(message, &self.filter)?;

        let reference = match &message.reply_to {
            Some(reference) => match self.platform.fetch_reference(reference).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    debug!("Reply reference fetch failed: {e:#}");
                    return Err(Rejection::ReferenceUnavailable);
                }
            },
            None => previous
                .and_then(Predecessor::into_fresh)
                .ok_or(Rejection::NoPrompt)?,
        };
        if reference.author_id == message.author_id {
            return Err(Rejection::SelfReply);
        }

        let prompt = normalize(&reference.content, &[bot_id, message.author_id.as_str()]);
        if prompt == response {
            return Err(Rejection::Echo);
        }

        let entry = CorpusEntry::new(prompt, response);
        if !corpus.write().await.push(entry.clone()) {
            return Err(Rejection::Excluded);
        }
        Ok(entry)
    }

    async fn check_surface(&self, message: &ChatMessage) -> Result<(), Rejection> {
        if message.channel.kind == ChannelKind::PrivateThread {
            return Err(Rejection::PrivateThread);
        }
        let base = self
            .platform
            .base_channel(&message.channel)
            .await
            .ok_or(Rejection::NoBaseChannel)?;
        if base.is_dm || message.channel.kind == ChannelKind::Dm {
            return Err(Rejection::DirectMessage);
        }
        if !base.visible_to_everyone {
            return Err(Rejection::HiddenChannel);
        }
        Ok(())
    }
}

/// The stored form of `message` as a response, or why it cannot be one.
///
/// The author's own mentions become the placeholder (the author plays the
/// responder when the pair is replayed); every other mention becomes the
/// generic user token.
pub fn candidate_response(
    message: &ChatMessage,
    filter: &ContentFilter,
) -> Result<String, Rejection> {
    let response = canonicalize_mentions(&message.content, &[message.author_id.as_str()]);

    if response.trim().is_empty() {
        return Err(Rejection::EmptyResponse);
    }
    if response.chars().count() > MAX_RESPONSE_CHARS {
        return Err(Rejection::TooLong);
    }
    if response.split('\n').count() > MAX_RESPONSE_LINES {
        return Err(Rejection::TooManyLines);
    }

    let flags = filter.scan(&response);
    if !flags.is_empty() {
        log_flags(&flags, &message.id);
        return Err(Rejection::InviteLink);
    }

    Ok(response)
}
