//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use crate::gateway::Operation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Wordbook storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Normalized gateway failure; displays only the user-facing message.
    #[error("{}", .0.failure_message())]
    Operation(Operation),
}

pub type Result<T> = std::result::Result<T, Error>;
