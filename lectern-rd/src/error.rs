//! Error types for lectern-rd
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the lectern-rd module
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Document download or storage errors
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Remote speech synthesis errors
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Remote chat completion errors
    #[error("Chat error: {0}")]
    Chat(String),

    /// Playback engine errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using lectern-rd Error
pub type Result<T> = std::result::Result<T, Error>;
