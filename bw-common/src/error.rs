//! Common error types for Blue Waves

use thiserror::Error;

/// Common result type for Blue Waves operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Blue Waves crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// I/O operation error (message of the underlying std::io::Error)
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
