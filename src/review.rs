//! Review thread bootstrap.
//!
//! The bot only answers inside one dedicated thread under a configured
//! parent channel. On startup the thread is found (or created), renamed to
//! point people at its pins, and its pinned consent prompt is refreshed.

use tracing::info;

use crate::consent::consent_prompt;
use crate::error::{ChatError, Result};
use crate::traits::ChatPlatform;

/// Display name of the chat feature, e.g. `"Echo Chat"`.
pub fn chat_name(bot_name: &str) -> String {
    format!("{bot_name} Chat")
}

/// Name the review thread is given.
pub fn thread_name(bot_name: &str) -> String {
    format!("{} (Check pins!)", chat_name(bot_name))
}

/// Find or create the review thread and make sure the consent prompt is
/// pinned in it. Returns the thread id, or `None` when no parent channel
/// is configured.
pub async fn ensure_review_thread(
    platform: &dyn ChatPlatform,
    parent_channel: Option<&str>,
    bot_name: &str,
) -> Result<Option<String>> {
    let Some(parent) = parent_channel else {
        info!("No review parent channel configured; replies disabled");
        return Ok(None);
    };

    let chat_name = chat_name(bot_name);
    let thread_name = thread_name(bot_name);
    let prompt = consent_prompt(&chat_name);

    let existing = platform
        .find_thread(parent, &chat_name)
        .await
        .map_err(ChatError::Platform)?;

    if let Some(thread) = existing {
        platform
            .rename_thread(&thread.id, &thread_name)
            .await
            .map_err(ChatError::Platform)?;

        let pinned = platform
            .pinned_messages(&thread.id)
            .await
            .map_err(ChatError::Platform)?;

        match pinned.iter().find(|m| m.editable) {
            Some(old) => {
                platform
                    .edit(&thread.id, &old.id, &prompt)
                    .await
                    .map_err(ChatError::Platform)?;
            }
            None => {
                let id = platform
                    .send(&thread.id, &prompt)
                    .await
                    .map_err(ChatError::Platform)?;
                platform
                    .pin(&thread.id, &id, &pin_reason(&chat_name))
                    .await
                    .map_err(ChatError::Platform)?;
            }
        }

        info!(thread = %thread.id, "Using existing review thread");
        return Ok(Some(thread.id));
    }

    let thread = platform
        .create_thread(parent, &thread_name, &format!("For {chat_name}"))
        .await
        .map_err(ChatError::Platform)?;
    let id = platform
        .send(&thread.id, &prompt)
        .await
        .map_err(ChatError::Platform)?;
    platform
        .pin(&thread.id, &id, &pin_reason(&chat_name))
        .await
        .map_err(ChatError::Platform)?;

    info!(thread = %thread.id, "Created review thread");
    Ok(Some(thread.id))
}

fn pin_reason(chat_name: &str) -> String {
    format!("Pinned {chat_name} consent message for ease of access")
}
