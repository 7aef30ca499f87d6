//! Shared text handling for echoclaw
//!
//! This crate provides the pure text layer of the responder: the
//! normalizer used for matching, mention canonicalization for stored and
//! displayed text, and the anti-advertising filter applied before
//! anything is learned.

pub mod filter;
pub mod mention;
pub mod normalize;

// Re-export commonly used types
pub use filter::{log_flags, ContentFilter, FilterFlag, FilterMetrics};
pub use mention::{canonicalize_mentions, mention, render_reply, BOT_PLACEHOLDER, USER_TOKEN};
pub use normalize::{normalize, strip_markdown};
