//! Mention canonicalization for stored and displayed text.
//!
//! Stored text never carries real user ids. Mentions of whoever plays the
//! responder role become [`BOT_PLACEHOLDER`]; every other user mention
//! becomes [`USER_TOKEN`]. [`render_reply`] turns the stored form back into
//! live mentions when a response is replayed.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Stand-in for the responder (the bot, when a pair is replayed).
pub const BOT_PLACEHOLDER: &str = "<@0>";

/// Stand-in for any other user; rendered as the person being answered.
pub const USER_TOKEN: &str = "<@user>";

/// `<@123>` and the legacy nickname form `<@!123>`.
static USER_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?(\d+)>").unwrap());

/// Platform mention markup for a user id.
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Rewrite user mentions into their stored form.
///
/// `responders` lists the ids that play the responder role in this text.
/// The placeholder itself (`<@0>`) is left alone so the rewrite is stable
/// when applied twice.
pub fn canonicalize_mentions(text: &str, responders: &[&str]) -> String {
    USER_MENTION_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let id = &caps[1];
            if id == "0" || responders.contains(&id) {
                BOT_PLACEHOLDER.to_string()
            } else {
                USER_TOKEN.to_string()
            }
        })
        .into_owned()
}

/// Render a stored response for display: the generic user token addresses
/// the person being answered, the placeholder becomes the bot's mention.
pub fn render_reply(stored: &str, bot_id: &str, addressee_id: &str) -> String {
    stored
        .replace(USER_TOKEN, &mention(addressee_id))
        .replace(BOT_PLACEHOLDER, &mention(bot_id))
}
