// src/error.rs

//! Error types for Packset operations

use thiserror::Error;

use crate::schema::SchemaError;
use crate::schema::state::InconsistentStateError;

/// Main error type for Packset operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or inconsistent manifest, or an invalid feature request
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Files on disk violate an exclusivity invariant
    #[error(transparent)]
    InconsistentState(#[from] InconsistentStateError),

    /// A rename destination already existed when its step ran
    #[error("Plan conflict at step {step}: destination already exists: {path}")]
    PlanConflict { step: usize, path: String },

    /// A rename step failed for any other reason
    #[error("Step {step} failed ({src} -> {dst}): {source}")]
    StepFailed {
        step: usize,
        src: String,
        dst: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),
}

/// Result type alias for Packset operations
pub type Result<T> = std::result::Result<T, Error>;
