//! CLI error types and exit codes

use entra_user_export::{ConfigError, ExportError, SelectionError};
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success (or the operator chose to exit)
/// - 1: Runtime failure (authentication, Graph API, writing output)
/// - 2: Configuration or input error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Selection(#[from] SelectionError),

    #[error("Input error: {0}")]
    Input(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Selection(_) => 2,
            CliError::Export(e) if e.is_config() => 2,
            CliError::Input(_) | CliError::Export(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Set TENANT_ID, CLIENT_ID, CLIENT_SECRET."),
            CliError::Selection(_) => {
                Some("Use menu numbers like 2,4,6, field names, or \"all\". Run with --list-fields to see them.")
            }
            CliError::Export(ExportError::Auth(_)) => {
                Some("Check the app registration's client ID, secret, and tenant.")
            }
            CliError::Export(ExportError::Http { status: 401 | 403, .. }) => Some(
                "Grant the app User.Read.All (and AuditLog.Read.All for sign-in activity) with admin consent.",
            ),
            CliError::Export(ExportError::Transport(_)) => {
                Some("Check your network connection, or raise EXPORT_TIMEOUT_SECS.")
            }
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
