use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An embedding does not have the index dimension. Raised before any mutation.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `add` was called with batches of unequal length. Raised before any mutation.
    #[error("Arity mismatch: {texts} texts, {metadatas} metadatas, {embeddings} embeddings")]
    ArityMismatch { texts: usize, metadatas: usize, embeddings: usize },

    #[error("Persistence unavailable at {}: {message}", path.display())]
    PersistenceUnavailable { path: PathBuf, message: String },

    #[error("Index {id} out of range for store of length {len}")]
    IndexOutOfRange { id: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Text extraction failed for {}: {message}", path.display())]
    Extraction { path: PathBuf, message: String },

    #[error("Upstream provider failed: {0}")]
    Upstream(String),
}

impl Error {
    pub fn persistence<E: std::fmt::Display>(path: impl Into<PathBuf>, err: E) -> Self {
        Error::PersistenceUnavailable { path: path.into(), message: err.to_string() }
    }

    pub fn extraction<E: std::fmt::Display>(path: impl Into<PathBuf>, err: E) -> Self {
        Error::Extraction { path: path.into(), message: err.to_string() }
    }

    /// True for errors that are rejected before the engine state is touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::DimensionMismatch { .. } | Error::ArityMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
