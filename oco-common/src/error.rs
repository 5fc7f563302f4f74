//! Common error types for oco

use thiserror::Error;

/// Common result type for oco operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the oco crates
///
/// Absent records are not errors: lookups return `Option` and the HTTP
/// boundary reports `None` as not found.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio container could not be probed
    #[error("Audio error: {0}")]
    Audio(String),
}
