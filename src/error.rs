//! Error types for taskmaster
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (unknown task, invalid input, bad arguments or config)
//! - 4: Operation failed (storage unreadable/unwritable, IO, lock contention)

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::FieldErrors;

/// Exit codes for the taskmaster CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskmaster operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task controller used outside of an active session")]
    OutsideSession,

    #[error("A session is already active")]
    SessionActive,

    // Operation failures (exit code 4)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::TaskNotFound(_)
            | Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::OutsideSession
            | Error::SessionActive => exit_codes::USER_ERROR,

            // Operation failures
            Error::Storage(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation(errors) => serde_json::to_value(errors).ok(),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            _ => None,
        }
    }

    /// True when the error means the targeted task does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TaskNotFound(_))
    }
}

/// Result type alias for taskmaster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
