//! Permanent, audited removal of a response.
//!
//! A moderator points at a message and confirms. The message text is put
//! into its stored form, barred from matching and learning, and every pair
//! carrying it is deleted. Nothing here can be undone.

use std::sync::Arc;

use echo_core::canonicalize_mentions;
use echo_corpus::Corpus;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::audit::{Attachment, AuditRecord, Severity};
use crate::error::{ChatError, Result};
use crate::message::ChatMessage;
use crate::traits::{AuditSink, ChatPlatform, CorpusStore};

/// A confirmed redaction of `target`, requested by `invoker_id`.
#[derive(Debug, Clone, Copy)]
pub struct RedactRequest<'a> {
    pub target: &'a ChatMessage,
    pub invoker_id: &'a str,
    /// Free text typed by the invoker. Must not be empty.
    pub confirmation: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactOutcome {
    Removed {
        deleted_count: usize,
        /// Whether the target message itself was deleted.
        message_deleted: bool,
    },
    NotFound,
}

impl RedactOutcome {
    pub fn deleted_count(&self) -> usize {
        match self {
            Self::Removed { deleted_count, .. } => *deleted_count,
            Self::NotFound => 0,
        }
    }

    /// Confirmation shown to the invoker.
    pub fn reply_text(&self) -> String {
        match self {
            Self::Removed { deleted_count, .. } => format!(
                "Permanently removed response. That response was associated with {}.",
                prompts(*deleted_count)
            ),
            Self::NotFound => "Could not find that as a response to any prompt!".to_string(),
        }
    }
}

fn prompts(count: usize) -> String {
    if count == 1 {
        "1 prompt".to_string()
    } else {
        format!("{count} prompts")
    }
}

pub struct Redactor {
    store: Arc<dyn CorpusStore>,
    audit: Arc<dyn AuditSink>,
    chat_name: String,
}

impl Redactor {
    pub fn new(
        store: Arc<dyn CorpusStore>,
        audit: Arc<dyn AuditSink>,
        chat_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            audit,
            chat_name: chat_name.into(),
        }
    }

    /// Redact the response carried by a chat message, then delete the
    /// message if anything was removed and the platform allows it.
    pub async fn redact(
        &self,
        corpus: &RwLock<Corpus>,
        platform: &dyn ChatPlatform,
        request: RedactRequest<'_>,
    ) -> Result<RedactOutcome> {
        if request.confirmation.trim().is_empty() {
            return Err(ChatError::Unconfirmed);
        }

        // The target's author played the responder when this was learned
        let target = request.target;
        let response = canonicalize_mentions(&target.content, &[target.author_id.as_str()]);

        let deleted_count = self
            .remove(corpus, &response, request.invoker_id)
            .await?;
        if deleted_count == 0 {
            return Ok(RedactOutcome::NotFound);
        }

        let message_deleted = match platform.delete_message(target).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("Failed to delete redacted message {}: {e:#}", target.id);
                false
            }
        };

        Ok(RedactOutcome::Removed {
            deleted_count,
            message_deleted,
        })
    }

    /// Redact a response already in its stored form.
    pub async fn redact_response(
        &self,
        corpus: &RwLock<Corpus>,
        response: &str,
        invoker_id: &str,
    ) -> Result<RedactOutcome> {
        let deleted_count = self.remove(corpus, response, invoker_id).await?;
        if deleted_count == 0 {
            return Ok(RedactOutcome::NotFound);
        }
        Ok(RedactOutcome::Removed {
            deleted_count,
            message_deleted: false,
        })
    }

    /// Exclude, delete, persist the exclusion and audit. Returns the number
    /// of durable pairs deleted.
    async fn remove(
        &self,
        corpus: &RwLock<Corpus>,
        response: &str,
        invoker_id: &str,
    ) -> Result<usize> {
        {
            let mut corpus = corpus.write().await;
            corpus.exclude(response);
            corpus.remove_response(response);
        }

        let deleted_count = self
            .store
            .delete_by_response(response)
            .await
            .map_err(ChatError::Store)?;
        if deleted_count == 0 {
            debug!("Redaction matched no stored pairs");
            return Ok(0);
        }

        if let Err(e) = self.store.record_exclusion(response).await {
            warn!("Failed to persist response exclusion: {e:#}");
        }

        let record = AuditRecord {
            message: format!(
                "<@{invoker_id}> permanently removed a response from {} ({})",
                self.chat_name,
                prompts(deleted_count)
            ),
            severity: Severity::ImportantUpdate,
            attachment: Some(Attachment::markdown(response)),
        };
        if let Err(e) = self.audit.log(record).await {
            warn!("Failed to write audit record: {e:#}");
        }

        info!(deleted = deleted_count, "Redacted response");
        Ok(deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_pluralizes() {
        let one = RedactOutcome::Removed {
            deleted_count: 1,
            message_deleted: true,
        };
        let two = RedactOutcome::Removed {
            deleted_count: 2,
            message_deleted: false,
        };
        assert_eq!(
            one.reply_text(),
            "Permanently removed response. That response was associated with 1 prompt."
        );
        assert_eq!(
            two.reply_text(),
            "Permanently removed response. That response was associated with 2 prompts."
        );
        assert_eq!(
            RedactOutcome::NotFound.reply_text(),
            "Could not find that as a response to any prompt!"
        );
    }

    #[test]
    fn deleted_count_of_not_found_is_zero() {
        assert_eq!(RedactOutcome::NotFound.deleted_count(), 0);
    }
}
