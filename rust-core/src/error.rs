//! Error types for the modal measurement core

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ModalError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModalError {
    /// Malformed data: mismatched or empty arrays, bad sample rate,
    /// or hits within one point that cannot be averaged together
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No valid hits to estimate from ("no data yet", not "bad data")
    #[error("No valid hits: {0}")]
    EmptyInput(String),

    /// Unknown hit id or point name
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("FFT processing failed: {0}")]
    Fft(String),

    /// A writer panicked while holding the shared session lock
    #[error("Session lock poisoned")]
    LockPoisoned,
}

impl ModalError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ModalError::InvalidInput(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        ModalError::NotFound(msg.into())
    }
}
