//! Error types for the Wordica trainer

use thiserror::Error;

/// Result type alias for Wordica operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Wordica trainer
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone unavailable or access denied
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// Audio device or stream error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Chat reply error
    #[error("chat error: {0}")]
    Chat(String),

    /// Response is missing an expected field or carries invalid data
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
