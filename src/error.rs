//! Error types for the pdf-chat library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ChatError`] — **Fatal to the operation**: it cannot start at all
//!   (configuration missing, file unreadable, HTTP client not buildable).
//!
//! * [`RequestError`] — **Recoverable**: one request to the backend failed.
//!   The controllers turn it into a user-visible notice and return to an
//!   interactive state; nothing is retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent an operation from starting.
#[derive(Debug, Error)]
pub enum ChatError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// No backend address was configured.
    #[error("Backend address is not configured.\nSet PDFCHAT_API_URL or pass --api-url <URL>.")]
    MissingApiUrl,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Selected file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── HTTP client errors ────────────────────────────────────────────────
    /// The reqwest client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A failed request to the question-answering backend.
///
/// Returned by [`crate::backend::Backend`] implementations and consumed by
/// the controllers, which map it to a notice via [`crate::notices`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The service answered with a non-2xx status.
    #[error("Backend rejected the request with HTTP {status}")]
    Rejected { status: u16 },

    /// No response was received (DNS, refused connection, reset).
    #[error("Could not reach the backend: {detail}")]
    Transport { detail: String },

    /// No response arrived before the configured timeout.
    #[error("Backend did not respond within {secs}s")]
    Timeout { secs: u64 },

    /// A 2xx response whose body is not what the endpoint promises.
    #[error("Backend returned an unexpected response: {detail}")]
    InvalidResponse { detail: String },
}

impl RequestError {
    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}
