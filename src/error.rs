//! Error handling and custom error types
//!
//! Provides unified error handling across the client using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key missing. Please create an environment variable named 'VITE_API_KEY' with your key.")]
    CredentialMissing,

    /// Non-success HTTP status. `message` comes from the server's error body
    /// when it has one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Model refused: {0}")]
    ModelRefusal(String),

    #[error("No image data returned from API")]
    NoImageData,

    #[error("No audio content returned")]
    NoAudioData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid data URI: {0}")]
    DataUri(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
