//! Error types for request building, dispatch, and response routing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classification of everything that can go wrong between `submit` and the
/// failure callback.
///
/// Transport and timeout failures mean no usable response was obtained.
/// `Format` means the body could not be parsed in the declared wire format,
/// `Mapping` means it parsed but did not fit the declared payload shape, and
/// `Business` means the server answered with a non-zero application status
/// code. `Encode` covers parameter/body encoding failures at build time.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    /// Connectivity failure, DNS failure, or any other transport-level error.
    #[error("transport error: {0}")]
    Transport(String),
    /// Request timed out.
    #[error("request timed out")]
    Timeout,
    /// The resolved request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// A merged header name or value is not a valid HTTP header.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// Parameter or body encoding failed at build time.
    #[error("parameter encoding failed: {0}")]
    Encode(String),
    /// Response body not parseable as the declared format.
    #[error("response format error: {0}")]
    Format(String),
    /// Response parsed but does not fit the declared payload shape.
    #[error("response mapping error: {0}")]
    Mapping(String),
    /// Well-formed response reporting a non-zero application status code.
    #[error("business error {code}: {}", .message.as_deref().unwrap_or("no message"))]
    Business {
        /// Application-level status code from the response body.
        code: i64,
        /// Server-supplied message, if any.
        message: Option<String>,
    },
    /// Filesystem error from the persistence store.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for ErrorKind {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Format(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ErrorKind {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// The error value handed to failure callbacks.
///
/// Wraps an [`ErrorKind`] together with the request URL and the wall-clock
/// timestamps bracketing the attempt, when they are known. Immutable once
/// constructed.
#[derive(Debug, Clone)]
pub struct NetworkError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// The URL the request was sent to, if one was resolved.
    pub request_url: Option<String>,
    /// When the request was handed to the transport.
    pub start_time: Option<DateTime<Utc>>,
    /// When the attempt finished.
    pub completed_time: Option<DateTime<Utc>>,
}

impl NetworkError {
    /// Create an error with no request context attached.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            request_url: None,
            start_time: None,
            completed_time: None,
        }
    }

    /// Attach request context to this error.
    pub(crate) fn with_context(
        mut self,
        request_url: Option<String>,
        start_time: DateTime<Utc>,
        completed_time: DateTime<Utc>,
    ) -> Self {
        self.request_url = request_url;
        self.start_time = Some(start_time);
        self.completed_time = Some(completed_time);
        self
    }

    /// A numeric code for this error.
    ///
    /// Transport-level failures report `-1` (no response was obtained).
    /// Business errors report the application status code from the body.
    /// The remaining build/parse kinds use stable negative codes.
    pub fn code(&self) -> i64 {
        match &self.kind {
            ErrorKind::Transport(_) | ErrorKind::Timeout => -1,
            ErrorKind::InvalidUrl(_) => -2,
            ErrorKind::InvalidHeader(_) => -3,
            ErrorKind::Encode(_) => -4,
            ErrorKind::Format(_) => -5,
            ErrorKind::Mapping(_) => -6,
            ErrorKind::Io(_) => -7,
            ErrorKind::Business { code, .. } => *code,
        }
    }

    /// Human-readable description of the failure.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<ErrorKind> for NetworkError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::from(err))
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, NetworkError>;
