use std::collections::BTreeMap;
use std::time::Duration;

/// Failure below HTTP semantics: no status line was received
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else {
            TransportError::Protocol(err.to_string())
        }
    }
}

/// The single error type surfaced by both client façades
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("validation failed ({status}): {message}")]
    Validation {
        status: u16,
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("rate limited: {message}")]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unexpected response status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Auth,
    NotFound,
    Validation,
    RateLimited,
    Server,
    Decode,
    Api,
    InvalidRequest,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::Server { .. } => ErrorKind::Server,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Api { .. } => ErrorKind::Api,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// HTTP status of the failed exchange, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. }
            | Error::Validation { status, .. }
            | Error::Server { status, .. }
            | Error::Api { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(404),
            Error::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Rate limits, 5xx responses and transport timeouts; everything else is deterministic
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RateLimited { .. }
                | Error::Server { .. }
                | Error::Transport(TransportError::Timeout(_))
        )
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Field-level details of a validation failure
    pub fn validation_fields(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Error::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub(crate) fn decode_message(message: impl std::fmt::Display) -> Self {
        Error::Decode(<serde_json::Error as serde::de::Error>::custom(message))
    }
}
