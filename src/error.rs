//! Error handling for the team optimizer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TeamOptimizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    /// A referenced record (usually a project) is absent from the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The employee pool is empty, so not even a fallback team can be built.
    #[error("No candidate pool: no employees available for project '{0}'")]
    NoCandidatePool(String),

    /// The embedding backend could not be loaded or failed to encode.
    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// A constraint clause that could not be understood. The parser drops
    /// such clauses and keeps going; this never aborts an optimization.
    #[error("Malformed constraint clause: '{0}'")]
    MalformedConstraint(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, TeamOptimizerError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for TeamOptimizerError {
    fn from(err: anyhow::Error) -> Self {
        TeamOptimizerError::Processing(err.to_string())
    }
}
