//! Error type for engine operations that surface failures to a caller.
//!
//! Most of the learning path never fails outward: rejections are logged and
//! dropped. `ChatError` covers the flows where a human is waiting on a
//! result (redaction, consent buttons, review thread setup, startup load).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Chat platform call failed
    #[error("Platform error: {0:#}")]
    Platform(anyhow::Error),

    /// Settings store read or write failed
    #[error("Settings error: {0:#}")]
    Settings(anyhow::Error),

    /// Durable corpus store failed
    #[error("Corpus store error: {0:#}")]
    Store(anyhow::Error),

    /// Redaction submitted without a confirmation
    #[error("Redaction was not confirmed")]
    Unconfirmed,
}

pub type Result<T> = std::result::Result<T, ChatError>;
