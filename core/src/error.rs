//! Error types for the redirect-following client.
//!
//! # Design
//! Transport failures and redirect-policy failures both end a logical
//! operation and both reach the caller through the same `Error` event.
//! `ClientError::kind` gives callers a discriminant to tell them apart
//! without matching on message text.

use thiserror::Error;

/// Failure of a single hop inside the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or protocol failure reported by ureq.
    #[error("transport failed: {0}")]
    Http(String),

    /// The request body stream or response body could not be read.
    #[error("body I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The options could not be rendered into a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Io(io) => TransportError::Io(io),
            other => TransportError::Http(other.to_string()),
        }
    }
}

/// Errors surfaced through `ClientEvent::Error`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying transport failed; the operation stops at this hop.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A redirect was warranted but the operation already used its budget.
    #[error("redirect limit reached ({limit})")]
    RedirectLimitExceeded { limit: u32 },

    /// A redirect status arrived without a `location` header.
    #[error("redirect status {status} without a location header")]
    MissingLocation { status: u16 },

    /// The `location` header could not be resolved against the request URL.
    #[error("invalid redirect location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a `ClientError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    RedirectLimitExceeded,
    InvalidRedirect,
    Config,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::RedirectLimitExceeded { .. } => ErrorKind::RedirectLimitExceeded,
            ClientError::MissingLocation { .. } | ClientError::InvalidLocation { .. } => {
                ErrorKind::InvalidRedirect
            }
            ClientError::Config(_) => ErrorKind::Config,
        }
    }
}
