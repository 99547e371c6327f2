//! Error types for bw-client
//!
//! Every non-success HTTP response lands in one of three buckets:
//! - `Unauthenticated`: the token endpoint refused the session
//! - `ValidationFailed`: a write endpoint answered 4xx
//! - `TransientFailure`: anything else
//!
//! The message is the server's `{ "error": ... }` text, verbatim.

use crate::routes::Route;
use thiserror::Error;

/// Main error type for bw-client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Token acquisition failed; the view must navigate to the login page
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// 4xx from a write endpoint, shown next to the form
    #[error("{message}")]
    ValidationFailed { status: u16, message: String },

    /// Any other non-success response
    #[error("{message}")]
    TransientFailure { status: u16, message: String },

    /// Transport-level failure (connect, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// A form was submitted while its previous submission is in flight
    #[error("A submission is already in progress")]
    SubmitInFlight,

    /// Local file I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// bw-common error
    #[error("Common error: {0}")]
    Common(#[from] bw_common::Error),
}

impl ClientError {
    /// Where navigation must go after this error, if anywhere
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ClientError::Unauthenticated { .. } => Some(Route::Login),
            _ => None,
        }
    }

    /// Whether the same request may be retried within the current view
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::TransientFailure { .. } | ClientError::Network(_)
        )
    }

    /// HTTP status attached to the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ValidationFailed { status, .. }
            | ClientError::TransientFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

/// Convenience Result type using bw-client ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
