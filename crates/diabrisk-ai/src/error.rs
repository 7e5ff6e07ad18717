use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid threshold artifact {path}: {reason}")]
    Threshold { path: PathBuf, reason: String },

    #[error("digest mismatch for {path}: expected {expected}, got {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("schema mismatch on column {column:?}: {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("model returned probability {0} outside [0, 1]")]
    InvalidProbability(f64),

    #[error("model returned no probabilities")]
    EmptyOutput,

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(#[from] ort::Error),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    pub(crate) fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
