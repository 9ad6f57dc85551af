//! Error types for ragex

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared by every ragex crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("prompt template not found at {path}: {reason}")]
    TemplateMissing { path: String, reason: String },

    #[error("template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable label for the error kind, used in logs and HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::RetrievalUnavailable(_) => "retrieval_unavailable",
            Error::GenerationUnavailable(_) => "generation_unavailable",
            Error::TemplateMissing { .. } => "template_missing",
            Error::Template(_) => "template",
            Error::Configuration(_) => "configuration",
            Error::InvalidInput(_) => "invalid_input",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
        }
    }

    /// Whether the error originates from an unreachable or misbehaving upstream service
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::RetrievalUnavailable(_) | Error::GenerationUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
