//! IONOS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IonosError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to read auth headers from {path}: {message}")]
    AuthHeadersUnreadable { path: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IonosError>;
