//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

/// Message shown when an error carries no text of its own.
pub const FALLBACK_MESSAGE: &str = "An error occurred";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to generate image")]
    GenerationFailed { status: u16 },

    #[error("No image URL in response")]
    MissingImage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// The text placed in a failed request state.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
