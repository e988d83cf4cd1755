//! Error types for Quickstart.
//!
//! Library crates use [`QuickstartError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every pipeline failure is converted at the orchestrator boundary into a
//! user-facing message ([`QuickstartError::user_message`]) and a step-trace
//! entry ([`QuickstartError::trace_entry`]). There is exactly one conversion
//! rule per kind.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for all Quickstart operations.
#[derive(Debug, thiserror::Error)]
pub enum QuickstartError {
    /// The submitted string is not an absolute http/https URL.
    #[error("invalid URL format: {raw}: {reason}")]
    InvalidUrlFormat { raw: String, reason: String },

    /// The page fetch exceeded its time bound.
    #[error("request to {url} timed out")]
    FetchTimeout { url: String },

    /// DNS, connection, TLS, or body-read failure.
    #[error("{cause}")]
    FetchTransport { url: String, cause: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for url: {url}")]
    HttpStatus { url: String, status: u16 },

    /// The extraction backend failed (unavailable, malformed response, quota...).
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// Anything not otherwise classified.
    #[error("unexpected error: {0}")]
    Unexpected(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No launchable component with this name.
    #[error("no component {name}")]
    ComponentNotFound { name: String },

    /// A component's start script could not be run or exited unsuccessfully.
    #[error("error starting component {name}: {message}")]
    Launch { name: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuickstartError>;

/// Serializable discriminant of [`QuickstartError`], carried in pipeline results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrlFormat,
    FetchTimeout,
    FetchTransport,
    HttpStatus,
    Extraction,
    Unexpected,
    Config,
    Io,
    ComponentNotFound,
    Launch,
}

impl QuickstartError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create an invalid-URL error, keeping the offending raw input.
    pub fn invalid_url(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrlFormat {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Point a fetch failure at the URL exactly as it was submitted.
    ///
    /// Other kinds are returned unchanged.
    pub fn with_submitted_url(self, submitted: &str) -> Self {
        let url = submitted.to_string();
        match self {
            Self::FetchTimeout { .. } => Self::FetchTimeout { url },
            Self::FetchTransport { cause, .. } => Self::FetchTransport { url, cause },
            Self::HttpStatus { status, .. } => Self::HttpStatus { url, status },
            other => other,
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrlFormat { .. } => ErrorKind::InvalidUrlFormat,
            Self::FetchTimeout { .. } => ErrorKind::FetchTimeout,
            Self::FetchTransport { .. } => ErrorKind::FetchTransport,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Unexpected(_) => ErrorKind::Unexpected,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
            Self::ComponentNotFound { .. } => ErrorKind::ComponentNotFound,
            Self::Launch { .. } => ErrorKind::Launch,
        }
    }

    /// Underlying cause text, without the variant prefix added by `Display`.
    fn cause(&self) -> String {
        match self {
            Self::Extraction { message } => message.clone(),
            Self::Unexpected(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Message shown to the user in the pipeline result's `error` field.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrlFormat { raw, .. } => format!(
                "Invalid URL format: {raw}. Please enter a valid URL (e.g., http://example.com)."
            ),
            Self::FetchTimeout { .. } => {
                "The request timed out. The server might be slow or the URL incorrect.".to_string()
            }
            Self::FetchTransport { .. } | Self::HttpStatus { .. } => {
                format!("Could not fetch content from URL: {self}")
            }
            other => format!("An unexpected error occurred: {}", other.cause()),
        }
    }

    /// Step-trace line describing this failure.
    pub fn trace_entry(&self) -> String {
        match self {
            Self::InvalidUrlFormat { raw, reason } => {
                format!("Error: Invalid URL format - {raw}. Details: {reason}")
            }
            Self::FetchTimeout { url } => format!("Error: Timeout fetching URL {url}."),
            Self::FetchTransport { url, .. } | Self::HttpStatus { url, .. } => {
                format!("Error: Could not fetch content from URL {url}. Details: {self}")
            }
            other => format!("Error: An unexpected error occurred: {}", other.cause()),
        }
    }
}
