use std::io;

use thiserror::Error;

/// Library-wide error type for wfd operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Missing or malformed projects/settings file, or bad environment.
    #[error("{0}")]
    Configuration(String),

    /// User input that cannot be accepted as given.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Unknown project, workflow, branch or run.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API quota exhausted.
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Polling exceeded the configured timeout.
    #[error("Workflow run {run_id} timed out after {elapsed_secs}s")]
    Timeout { run_id: u64, elapsed_secs: u64 },

    /// Transient transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected HTTP status from the workflow host.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// Process exit code for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) => 2,
            AppError::Auth(_) => 3,
            AppError::NotFound(_) => 4,
            AppError::RateLimit(_) => 5,
            AppError::Timeout { .. } => 6,
            AppError::Network(_) => 7,
            AppError::Io(_)
            | AppError::Configuration(_)
            | AppError::Api { .. }
            | AppError::ParseError { .. }
            | AppError::YamlParse(_) => 1,
        }
    }
}
