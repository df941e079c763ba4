//! Error types for content fetching.
//!
//! Every failure that can happen while talking to the content API is a
//! distinct variant, so callers can tell a missing document from a
//! network outage or a cancelled request.

use thiserror::Error;

/// Result alias for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Failures surfaced by a [`ContentSource`](crate::client::ContentSource)
/// or by the listing controller.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The API answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected JSON shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// No document with this uid exists.
    #[error("document not found: {uid}")]
    NotFound { uid: String },

    /// The API root did not advertise a master ref.
    #[error("no master ref advertised by {endpoint}")]
    NoMasterRef { endpoint: String },

    /// Bad client configuration (empty endpoint, unparsable URL).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The fetch was aborted before it resolved.
    #[error("fetch cancelled")]
    Cancelled,
}

impl ContentError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ContentError::Transport { .. } => true,
            ContentError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ContentError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ContentError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            ContentError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        ContentError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ContentError {
    fn from(err: url::ParseError) -> Self {
        ContentError::Config(err.to_string())
    }
}
