//! Error types for the user export pipeline.

use thiserror::Error;

/// Result type alias using `ExportError`.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting users from Entra ID.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration validation error (missing credentials, bad endpoint).
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` client-credentials grant did not yield a usable token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-success response from Microsoft Graph, after any retries.
    #[error("GET {url} failed [{status}]: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// Transport-level failure (connection refused, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Persisting the export failed.
    #[error("Sink error: {0}")]
    Sink(#[from] std::io::Error),

    /// A single user record could not be normalized.
    #[error("Record error: {0}")]
    Record(String),
}

impl ExportError {
    /// Returns the HTTP status for `Http` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for errors raised before any network activity.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
