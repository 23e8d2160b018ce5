//! Error types for the clinic staff client

use thiserror::Error;

use crate::notify::{Level, Notification};

/// Result type alias using the client's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Client error types
///
/// Validation failures block a request before it is issued; network and
/// API failures are recoverable and only ever surfaced as notifications;
/// session failures force the router back to the login screen.
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (E001-E099): local, pre-submission
    #[error("{0}")]
    Validation(String),

    // Network errors (E100-E199): transport failure, previous data preserved
    #[error("Network error: {0}. Check your connection to the clinic server.")]
    Network(#[from] reqwest::Error),

    /// Server answered with an ERROR envelope; message is shown verbatim
    #[error("{0}")]
    Api(String),

    #[error("{0} not found")]
    NotFound(String),

    // Session errors (E300-E399): corrupt or missing persisted identity
    #[error("Your session is invalid or has expired. Please log in again.")]
    Session,

    // Config errors (E400-E499)
    #[error("Configuration error: {0}")]
    Config(String),

    // Input errors (E500-E599)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed server response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the stable error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E001",
            Self::Network(_) => "E100",
            Self::Api(_) => "E101",
            Self::NotFound(_) => "E102",
            Self::Session => "E300",
            Self::Config(_) => "E400",
            Self::InvalidInput(_) => "E500",
            Self::Serialization(_) => "E103",
            Self::Io(_) => "E999",
        }
    }

    /// Whether the current view can survive this error with its data intact
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Session)
    }

    /// Convert this error into a user-facing notification
    pub fn notification(&self) -> Notification {
        Notification::new(Level::Error, self.to_string())
    }
}
