//! echoclaw: a retrieval chat responder that learns from conversation.
//!
//! Pairs of `(prompt, response)` are harvested from channels whose authors
//! consented, and replayed in a dedicated review thread when a new message
//! is close enough to a stored prompt. Moderators can permanently redact a
//! response. Text handling lives in `echo-core`, the corpus and its
//! persistence in `echo-corpus`; this crate wires them to a chat platform.

pub mod audit;
pub mod cli;
pub mod config;
pub mod consent;
pub mod engine;
pub mod error;
pub mod last_message;
pub mod learner;
pub mod message;
pub mod redactor;
pub mod responder;
pub mod review;
pub mod traits;

pub use engine::{ChatEngine, Collaborators, CorpusStats, EngineOptions, Reaction};
pub use error::{ChatError, Result};
