//! Error types for trk
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation failure, bad args)
//! - 3: Referenced entity not found
//! - 4: Operation failed (store error, lock contention)

use std::path::PathBuf;
use thiserror::Error;

use crate::store::Collection;

/// Exit codes for the trk CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// A step in a multi-step write sequence.
///
/// Labels transport failures so callers can tell which part of
/// `validate -> allocate -> write -> sync -> notify` broke, and whether a
/// retry needs to recreate the primary record or only the dependent ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStep {
    Allocate,
    WriteTask,
    WriteProject,
    SyncAttachments,
    Notify,
}

impl std::fmt::Display for WriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WriteStep::Allocate => "id allocation",
            WriteStep::WriteTask => "task write",
            WriteStep::WriteProject => "project write",
            WriteStep::SyncAttachments => "attachment sync",
            WriteStep::Notify => "notification fan-out",
        };
        f.write_str(name)
    }
}

/// Main error type for trk operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Missing references (exit code 3)
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    // Operation failures (exit code 4)
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: Collection, id: u64 },

    #[error("record {key} missing from {collection}")]
    MissingRecord { collection: Collection, key: String },

    #[error("{step} failed: {source}")]
    Step {
        step: WriteStep,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Validation failure tied to a specific input field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure with the write step it occurred in.
    pub fn in_step(self, step: WriteStep) -> Self {
        Error::Step {
            step,
            source: Box::new(self),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation { .. } | Error::InvalidArgument(_) | Error::InvalidConfig(_) => {
                exit_codes::USER_ERROR
            }

            Error::NotFound { .. } => exit_codes::NOT_FOUND,

            Error::Step { source, .. } => source.exit_code(),

            Error::DuplicateId { .. }
            | Error::MissingRecord { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error envelopes.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            Error::NotFound { entity, id } => {
                Some(serde_json::json!({ "entity": entity, "id": id }))
            }
            Error::DuplicateId { collection, id } => {
                Some(serde_json::json!({ "collection": collection.as_str(), "id": id }))
            }
            Error::Step { step, .. } => Some(serde_json::json!({ "step": step })),
            _ => None,
        }
    }
}

/// Result type alias for trk operations
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
