//! Reply gate and reply rendering for the review thread.

use echo_core::{normalize, render_reply};
use echo_corpus::Corpus;
use rand::Rng;

use crate::message::ChatMessage;

/// Whether `message` is addressed to the bot.
///
/// The bot answers a message that mentions it, or one that mentions nobody
/// other than its own author. Its own messages are never answered.
pub fn is_addressed(message: &ChatMessage, bot_id: &str) -> bool {
    if message.author_id == bot_id {
        return false;
    }
    message.mentions_user(bot_id) || message.mentions.iter().all(|id| *id == message.author_id)
}

/// Pick a reply for `message` from the corpus, rendered for display.
///
/// Callers check [`is_addressed`] and the channel first.
pub fn respond<R: Rng + ?Sized>(
    corpus: &Corpus,
    message: &ChatMessage,
    bot_id: &str,
    rng: &mut R,
) -> Option<String> {
    let prompt = normalize(&message.content, &[bot_id]);
    let entry = corpus.find_matches(&prompt, rng).into_iter().next()?;
    Some(render_reply(&entry.response, bot_id, &message.author_id))
}
