//! Error types for CampusNotes

use thiserror::Error;

/// Result type alias using CampusNotes' Error
pub type Result<T> = std::result::Result<T, Error>;

/// CampusNotes error types
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors
    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    #[error("{0} '{1}' not found")]
    NotFound(&'static str, String),

    // Validation errors
    #[error("Invalid input: {0}")]
    Validation(String),

    // Conflict errors (duplicate email, duplicate rating, ...)
    #[error("{0}")]
    Conflict(String),

    // Auth errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Admin privileges required")]
    Forbidden,

    // Upload errors
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    // Outbound service errors
    #[error("Media host error: {0}")]
    MediaHost(String),

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is caused by bad client input rather than a fault
    /// in the server or its dependencies.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::NoteNotFound(_)
                | Self::NotFound(..)
                | Self::Validation(_)
                | Self::Conflict(_)
                | Self::InvalidCredentials
                | Self::InvalidToken
                | Self::Forbidden
                | Self::UploadRejected(_)
        )
    }
}
