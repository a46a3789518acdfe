use std::path::PathBuf;

use thiserror::Error;

/// Boxed error carried by failures that originate in an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing required configuration: {0}")]
    ConfigMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format '{extension}': {}", path.display())]
    FormatUnsupported { path: PathBuf, extension: String },

    #[error("Embedding failed: {0}")]
    EmbeddingFailure(#[source] BoxError),

    #[error("Generation failed: {0}")]
    GenerationFailure(#[source] BoxError),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Collection '{0}' has already been cleared")]
    AlreadyCleared(String),

    #[error("Storage error: {0}")]
    Storage(#[source] BoxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn embedding<E: Into<BoxError>>(err: E) -> Self { Self::EmbeddingFailure(err.into()) }

    pub fn generation<E: Into<BoxError>>(err: E) -> Self { Self::GenerationFailure(err.into()) }

    pub fn storage<E: Into<BoxError>>(err: E) -> Self { Self::Storage(err.into()) }
}

pub type Result<T> = std::result::Result<T, Error>;
