//! Error types for segue.
//!
//! Collaborators (stores, persistence, audio output) return these. Session
//! operations never surface them to callers; they log and degrade instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be encoded
    #[error("Persistence encode error: {0}")]
    PersistEncode(#[from] toml::ser::Error),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Audio bytes could not be decoded into a playable source
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// The output refused to start playback
    #[error("Playback rejected: {0}")]
    PlayRejected(String),
}

/// Convenience Result type using segue's Error
pub type Result<T> = std::result::Result<T, Error>;
