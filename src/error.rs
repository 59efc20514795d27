//! Error types and handling for the `TravelParse` pipeline

use thiserror::Error;

/// Main error type for the `TravelParse` pipeline
///
/// No variant is fatal to email parsing itself: assisted-extractor
/// failures are recovered inside the orchestrator and turn into a
/// heuristic fallback, never into a caller-visible error.
#[derive(Error, Debug)]
pub enum TravelParseError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Assisted-extractor boundary errors (network, protocol, bad payload)
    #[error("Assisted extractor error: {message}")]
    Assisted { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TravelParseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new assisted-extractor error
    pub fn assisted<S: Into<String>>(message: S) -> Self {
        Self::Assisted {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelParseError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TravelParseError::Assisted { .. } => {
                "Unable to reach the AI extraction service. Heuristic parsing was used instead."
                    .to_string()
            }
            TravelParseError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelParseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TravelParseError::General { message } => message.clone(),
        }
    }
}
