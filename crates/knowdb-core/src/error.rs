use std::time::Duration;

use thiserror::Error;

/// Failures raised by an embedding provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("embedding provider failed: {0}")]
    Failed(String),

    #[error("embedding provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate document id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index is empty")]
    EmptyIndex,

    /// Provider failure while embedding documents for a build.
    #[error("Embedding failed during ingestion: {0}")]
    Provider(#[from] ProviderError),

    /// Provider failure while embedding a query. Distinct from "nothing found".
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] ProviderError),

    #[error("Formatting failed: {0}")]
    Format(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// True for failures caused by a degraded embedding provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Error::Provider(_) | Error::Retrieval(_))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(e: std::fmt::Error) -> Self {
        Error::Format(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
