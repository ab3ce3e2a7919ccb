//! Error types for minishell.

use thiserror::Error;

/// Main error type for minishell operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The child process could not be started
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        /// Program that was requested
        program: String,
        /// Underlying spawn or pipe error
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be delivered to the child's input
    #[error("Error writing to shell: {0}")]
    Write(#[source] std::io::Error),

    /// Draining the child's output failed for a reason other than end of stream
    #[error("Error reading output: {0}")]
    Read(#[source] std::io::Error),

    /// Session already terminated
    #[error("Session already terminated")]
    SessionTerminated,

    /// Input to the child was closed by the caller
    #[error("Session input closed")]
    InputClosed,

    /// Session has not been started yet
    #[error("Session not started")]
    NotStarted,

    /// Session was already started once
    #[error("Session already started")]
    AlreadyStarted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or parameters (generic)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether this error ends the session for good.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Launch { .. } | Error::SessionTerminated)
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
