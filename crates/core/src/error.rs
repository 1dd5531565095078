use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("document folder not found or not a directory: {}", .0.display())]
    FolderMissing(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error in {}: {details}", .path.display())]
    PdfParse { path: PathBuf, details: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap {overlap} must be smaller than chunk_size {size}")]
    OverlapTooLarge { overlap: usize, size: usize },
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("missing embedding api key (set GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding backend returned {status}: {details}")]
    Backend { status: u16, details: String },

    #[error("embedding dimension {actual} does not match expected {expected}")]
    MalformedVector { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("index artifact missing: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("index artifacts are inconsistent: {0}")]
    Corrupt(String),

    #[error("stored vectors have dimension {stored} but embedder produces {embedder}")]
    DimensionMismatch { stored: usize, embedder: usize },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("top_k must be greater than zero")]
    InvalidTopK,

    #[error("index contains no entries")]
    EmptyIndex,

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}
