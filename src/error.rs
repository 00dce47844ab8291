//! Error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`RestError`]. The variants follow the lifecycle of a dispatch:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`RestError::InvalidArgument`] | inputs are rejected before any I/O |
//! | [`RestError::Cancelled`] | the cancellation token fires before or during a step |
//! | [`RestError::Serialization`] | a payload cannot be encoded, or a JSON body cannot be decoded |
//! | [`RestError::Transport`] | the transport fails; the original error is kept as the source |
//! | [`RestError::HeaderParse`] | a header cannot be represented on the wire |
//! | [`RestError::Io`] | a destination stream rejects a write or seek |
//!
//! A JSON response whose media type is not `application/json` is *not* an
//! error: the content is simply left unset.

use thiserror::Error;

/// Boxed error used to carry transport failures unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, RestError>;

/// Errors produced while building, dispatching or reading a message.
#[derive(Debug, Error)]
pub enum RestError {
    /// An argument was rejected before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,

    /// A payload could not be serialized, or a body could not be deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The transport failed. No translation or retry is applied.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// A header name or value is not valid on the wire.
    #[error("header parse error: {0}")]
    HeaderParse(String),

    /// Writing to or seeking a destination stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RestError {
    /// Wrap any transport-level failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RestError::Transport(err.into())
    }

    /// Whether this error is the result of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RestError::Cancelled)
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        RestError::Transport(Box::new(err))
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::Serialization(err.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for RestError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        RestError::Serialization(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for RestError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        RestError::HeaderParse(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for RestError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        RestError::HeaderParse(err.to_string())
    }
}
