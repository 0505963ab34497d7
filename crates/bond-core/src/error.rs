//! Error types for bond-core

use thiserror::Error;

/// Result type alias for bond-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// A trigger or routing pattern failed to compile at construction
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Agent construction failed (bad template, empty rule table, ...)
    #[error("agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Query processing failed
    #[error("agent processing failed: {0}")]
    ProcessingFailed(String),
}
