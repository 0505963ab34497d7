//! Error types for agent construction and query processing

use thiserror::Error;

/// Result type alias for agent operations
pub type AgentResult<T> = std::result::Result<T, AgentError>;

/// Agent-specific errors
///
/// Pattern and template failures surface at construction; the only runtime
/// error paths are template rendering and record serialization. "No data"
/// conditions are typed responses, never errors.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A trigger or routing pattern failed to compile
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A response template failed to parse or render
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A matched record set failed to serialize into the envelope
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convert AgentError to bond_core::Error
impl From<AgentError> for bond_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Pattern { pattern, source } => bond_core::Error::Pattern { pattern, source },
            other => bond_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}
