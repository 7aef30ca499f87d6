//! Prompt/response corpus for echoclaw.
//!
//! This crate holds the learned `(prompt, response)` pairs: the in-memory
//! working copy used for matching, the similarity threshold cascade that
//! picks replies, and the SQLite store that mirrors the corpus and the
//! redaction exclusions to disk.

pub mod corpus;
pub mod matcher;
pub mod similarity;
pub mod store;
pub mod types;

pub use corpus::Corpus;
pub use matcher::{cascade, find_matches, CASCADE_THRESHOLDS};
pub use similarity::similarity;
pub use store::SqliteCorpusStore;
pub use types::{CascadeHit, CorpusEntry, ExclusionSet};
