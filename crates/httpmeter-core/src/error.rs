//! Shared error type across httpmeter crates.

use thiserror::Error;

/// Stable error codes (used by tests and log fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Label configuration rejected.
    InvalidLabel,
    /// Settings could not be read or parsed.
    Config,
}

impl ErrorCode {
    /// String representation used in logs and assertions.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidLabel => "INVALID_LABEL",
            ErrorCode::Config => "CONFIG",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type used by core and layer.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("invalid label: {0}")]
    InvalidLabel(String),
    #[error("config: {0}")]
    Config(String),
}

impl MeterError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeterError::InvalidLabel(_) => ErrorCode::InvalidLabel,
            MeterError::Config(_) => ErrorCode::Config,
        }
    }
}
