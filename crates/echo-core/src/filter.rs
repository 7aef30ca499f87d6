//! Anti-advertising filter for learned responses.
//!
//! Server invites and bot authorization links are never learned; a
//! response containing either is dropped before it reaches the corpus.

use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Compiled regexes, allocated once.
static SERVER_INVITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?(?:discord\.gg|discord(?:app)?\.com/invite)/[\w-]+")
        .unwrap()
});
static BOT_INVITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.|ptb\.|canary\.)?discord(?:app)?\.com/(?:api/)?oauth2/authorize/?\?\S*client_id=\d+",
    )
    .unwrap()
});

// ── Types ────────────────────────────────────────────────────────

/// Why a piece of text was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFlag {
    ServerInvite,
    BotInvite,
}

/// Counters for observability.
#[derive(Debug, Default)]
pub struct FilterMetrics {
    pub server_invites: AtomicU64,
    pub bot_invites: AtomicU64,
}

/// Shared content filter; clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub metrics: Arc<FilterMetrics>,
}

impl ContentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags raised by `text`. Empty means the text may be learned.
    pub fn scan(&self, text: &str) -> Vec<FilterFlag> {
        let mut flags = Vec::new();

        if SERVER_INVITE_RE.is_match(text) {
            flags.push(FilterFlag::ServerInvite);
            self.metrics.server_invites.fetch_add(1, Ordering::Relaxed);
        }
        if BOT_INVITE_RE.is_match(text) {
            flags.push(FilterFlag::BotInvite);
            self.metrics.bot_invites.fetch_add(1, Ordering::Relaxed);
        }

        flags
    }

    /// Total number of flags raised so far.
    pub fn blocked_total(&self) -> u64 {
        self.metrics.server_invites.load(Ordering::Relaxed)
            + self.metrics.bot_invites.load(Ordering::Relaxed)
    }
}

/// Log filter hits at debug level; they are routine, not errors.
pub fn log_flags(flags: &[FilterFlag], context: &str) {
    for flag in flags {
        match flag {
            FilterFlag::ServerInvite => {
                tracing::debug!(context = %context, "Server invite in candidate response; not learned");
            }
            FilterFlag::BotInvite => {
                tracing::debug!(context = %context, "Bot invite in candidate response; not learned");
            }
        }
    }
}
