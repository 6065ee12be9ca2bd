//! Domain-specific error types for essaygen

use thiserror::Error;

/// Main error type for the essaygen tool
#[derive(Error, Debug)]
pub enum EssaygenError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Completion provider error: {message}")]
    Completion { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Theme matrix error: {message}")]
    Matrix { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for EssaygenError {
    fn from(err: anyhow::Error) -> Self {
        EssaygenError::Internal {
            message: format!("{err:#}"),
        }
    }
}

impl From<serde_json::Error> for EssaygenError {
    fn from(err: serde_json::Error) -> Self {
        EssaygenError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EssaygenError {
    fn from(err: toml::de::Error) -> Self {
        EssaygenError::Config {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for EssaygenError {
    fn from(err: reqwest::Error) -> Self {
        EssaygenError::Completion {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<std::io::Error> for EssaygenError {
    fn from(err: std::io::Error) -> Self {
        EssaygenError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias for essaygen operations
pub type Result<T> = std::result::Result<T, EssaygenError>;
