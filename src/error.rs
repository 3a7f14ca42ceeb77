//! Error types for the Basalt balancing core.
//!
//! This module provides a unified error type [`BasaltError`] for all core
//! operations, along with a convenient [`Result`] type alias.
//!
//! Most of what goes "wrong" during a balancing cycle is not an error at
//! all: a sampled candidate that fails an admission check is simply
//! discarded, and a tier with no eligible relocation is skipped. Errors are
//! reserved for contract violations (malformed move arguments, unknown
//! servers or segments) and for configuration or collaborator failures.
//!
//! # Example
//!
//! ```rust
//! use basalt::error::{BasaltError, Result};
//!
//! fn check_endpoints(from: &str, to: &str) -> Result<()> {
//!     if from == to {
//!         return Err(BasaltError::PreconditionFailed(
//!             "source and destination must differ".into(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_endpoints("node-a", "node-a").unwrap_err().is_precondition());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for Basalt core operations.
#[derive(Error, Debug)]
pub enum BasaltError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Move contract violations
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Unknown server: {0}")]
    UnknownServer(String),

    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    // Collaborator failures
    #[error("Coordinator unavailable: {0}")]
    CoordinatorUnavailable(String),

    #[error("Snapshot failed: {0}")]
    SnapshotFailed(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BasaltError {
    /// Whether this error is a programming-contract violation on a move
    /// intent. These fail fast and are never silently ignored.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            BasaltError::PreconditionFailed(_)
                | BasaltError::UnknownServer(_)
                | BasaltError::UnknownSegment(_)
        )
    }

    /// Whether retrying on a later cycle may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BasaltError::CoordinatorUnavailable(_) | BasaltError::SnapshotFailed(_)
        )
    }
}

impl From<serde_json::Error> for BasaltError {
    fn from(e: serde_json::Error) -> Self {
        BasaltError::Serialization(e.to_string())
    }
}

/// Result type alias for Basalt core operations.
pub type Result<T> = std::result::Result<T, BasaltError>;
