pub mod chunking;
pub mod clean;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod models;
pub mod store;

pub use chunking::{split_documents, split_text};
pub use clean::{clean_documents, clean_text};
pub use embeddings::{
    Embedder, GeminiEmbedder, HashEmbedder, GEMINI_EMBEDDING_DIMENSIONS, GEMINI_EMBEDDING_MODEL,
};
pub use error::{ConfigError, EmbeddingError, LoadError, PersistError, QueryError};
pub use extractor::{LopdfExtractor, PageText, PdfExtractor};
pub use loader::{discover_pdf_files, load_documents, load_documents_with};
pub use models::{Chunk, ChunkingConfig, Document, DocumentMetadata};
pub use store::{VectorStore, CHUNK_ARTIFACT, VECTOR_ARTIFACT};
