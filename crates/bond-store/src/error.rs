//! Error types for dataset loading

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type for dataset loading
///
/// Load failures are the only hard errors in the system; everything after a
/// successful load degrades to typed responses instead of erroring.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The CSV source could not be opened or a record failed to parse
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: csv::Error,
    },
}
