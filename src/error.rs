//! Error types for Pensum.

use thiserror::Error;

/// Library-level error type for Pensum operations.
#[derive(Error, Debug)]
pub enum PensumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No content artifact found for lecture '{lecture}'")]
    SourceNotFound { lecture: String },

    #[error("Lecture '{lecture}' yielded no usable content units after cleaning")]
    EmptyContent { lecture: String },

    #[error("Embedding service unavailable: {0}")]
    Embedding(String),

    #[error("Generation service unavailable: {0}")]
    Generation(String),

    #[error("Index schema mismatch: index holds {found}-dimensional embeddings, expected {expected}. Rebuild the index with 'pensum index --force'.")]
    IndexSchemaMismatch { expected: usize, found: usize },

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Pensum operations.
pub type Result<T> = std::result::Result<T, PensumError>;
