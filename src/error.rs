//! Error types for filtered collections
//!
//! This module defines all error types used throughout the crate.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for collection operations
///
/// Validation errors (`MissingIdentifier`, `MissingSortAttribute`,
/// `BadArguments`) are raised before any state mutation or read executes,
/// so a failed call never leaves a collection partially modified.
/// `Storage` and `Codec` errors abort the in-progress operation and are
/// propagated unwrapped; the engine never retries or swallows them.
#[derive(Debug, Error)]
pub enum Error {
    /// Element reference exposes no identifier
    #[error("element reference has no identifier")]
    MissingIdentifier,

    /// Element reference lacks the field the collection is ordered by
    #[error("element reference lacks sort attribute `{attribute}`")]
    MissingSortAttribute {
        /// Name of the configured ordering attribute
        attribute: String,
    },

    /// Invalid arguments supplied to a read path
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// Key-value backend failure (get/set/delete)
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization failure
    #[error("codec error: {0}")]
    Codec(String),
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Codec(e.to_string())
    }
}
