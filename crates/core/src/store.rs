use crate::embeddings::Embedder;
use crate::error::{EmbeddingError, PersistError, QueryError};
use crate::models::Chunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const VECTOR_ARTIFACT: &str = "index.vectors.json";
pub const CHUNK_ARTIFACT: &str = "index.chunks.json";

#[derive(Debug, Clone)]
struct IndexEntry {
    id: Uuid,
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory similarity index over embedded chunks. Persists as two
/// artifacts side by side: the vector rows and the chunk store, paired by
/// entry id and kept in insertion order.
pub struct VectorStore<E: Embedder> {
    embedder: E,
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorArtifact {
    dimensions: usize,
    rows: Vec<VectorRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorRow {
    id: Uuid,
    values: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChunkArtifact {
    built_at: DateTime<Utc>,
    entries: Vec<ChunkRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChunkRow {
    id: Uuid,
    chunk: Chunk,
}

impl<E: Embedder> VectorStore<E> {
    /// Embeds every chunk in input order. Any provider failure or
    /// wrong-dimension vector aborts the whole build; an empty chunk set
    /// builds an empty index.
    pub fn build(chunks: Vec<Chunk>, embedder: E) -> Result<Self, EmbeddingError> {
        let mut entries = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let vector = embedder.embed(&chunk.text)?;
            if vector.len() != embedder.dimensions() {
                return Err(EmbeddingError::MalformedVector {
                    expected: embedder.dimensions(),
                    actual: vector.len(),
                });
            }

            entries.push(IndexEntry {
                id: Uuid::new_v4(),
                chunk,
                vector,
            });
        }

        Ok(Self { embedder, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes both artifacts under `folder`, creating it if absent. Each
    /// artifact goes to a temporary sibling first and is renamed into place
    /// only after both writes succeed, so a failed write leaves any
    /// previous pair untouched. The rename step itself is best-effort: the
    /// two renames are not a single atomic unit.
    pub fn persist(&self, folder: &Path) -> Result<(), PersistError> {
        fs::create_dir_all(folder)?;

        let vectors = VectorArtifact {
            dimensions: self.embedder.dimensions(),
            rows: self
                .entries
                .iter()
                .map(|entry| VectorRow {
                    id: entry.id,
                    values: entry.vector.clone(),
                })
                .collect(),
        };

        let chunks = ChunkArtifact {
            built_at: Utc::now(),
            entries: self
                .entries
                .iter()
                .map(|entry| ChunkRow {
                    id: entry.id,
                    chunk: entry.chunk.clone(),
                })
                .collect(),
        };

        let vector_tmp = folder.join(format!("{VECTOR_ARTIFACT}.tmp"));
        let chunk_tmp = folder.join(format!("{CHUNK_ARTIFACT}.tmp"));

        let outcome = (|| -> Result<(), PersistError> {
            fs::write(&vector_tmp, serde_json::to_vec(&vectors)?)?;
            fs::write(&chunk_tmp, serde_json::to_vec(&chunks)?)?;
            fs::rename(&vector_tmp, folder.join(VECTOR_ARTIFACT))?;
            fs::rename(&chunk_tmp, folder.join(CHUNK_ARTIFACT))?;
            Ok(())
        })();

        if outcome.is_err() {
            let _ = fs::remove_file(&vector_tmp);
            let _ = fs::remove_file(&chunk_tmp);
        }

        outcome
    }

    /// Reads both artifacts back. The embedder must match the one used at
    /// build time; it encodes future queries and is validated against the
    /// stored dimensionality, never used to re-embed stored chunks.
    pub fn load(folder: &Path, embedder: E) -> Result<Self, PersistError> {
        let vector_path = folder.join(VECTOR_ARTIFACT);
        let chunk_path = folder.join(CHUNK_ARTIFACT);

        for path in [&vector_path, &chunk_path] {
            if !path.is_file() {
                return Err(PersistError::MissingArtifact(path.clone()));
            }
        }

        let vectors: VectorArtifact = serde_json::from_slice(&fs::read(&vector_path)?)?;
        let chunks: ChunkArtifact = serde_json::from_slice(&fs::read(&chunk_path)?)?;

        if vectors.dimensions != embedder.dimensions() {
            return Err(PersistError::DimensionMismatch {
                stored: vectors.dimensions,
                embedder: embedder.dimensions(),
            });
        }

        if vectors.rows.len() != chunks.entries.len() {
            return Err(PersistError::Corrupt(format!(
                "{} vector rows but {} chunk entries",
                vectors.rows.len(),
                chunks.entries.len()
            )));
        }

        let mut entries = Vec::with_capacity(vectors.rows.len());
        for (row, chunk_row) in vectors.rows.into_iter().zip(chunks.entries) {
            if row.id != chunk_row.id {
                return Err(PersistError::Corrupt(format!(
                    "vector row {} is paired with chunk entry {}",
                    row.id, chunk_row.id
                )));
            }
            if row.values.len() != vectors.dimensions {
                return Err(PersistError::Corrupt(format!(
                    "vector row {} has dimension {}",
                    row.id,
                    row.values.len()
                )));
            }

            entries.push(IndexEntry {
                id: row.id,
                chunk: chunk_row.chunk,
                vector: row.values,
            });
        }

        Ok(Self { embedder, entries })
    }

    /// Embeds `query` and returns the `top_k` nearest chunks by cosine
    /// similarity, nearest first. The sort is stable, so equal scores keep
    /// insertion order.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>, QueryError> {
        if top_k == 0 {
            return Err(QueryError::InvalidTopK);
        }
        if self.entries.is_empty() {
            return Err(QueryError::EmptyIndex);
        }

        let query_vector = self.embedder.embed(query)?;

        let mut ranked: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(&query_vector, &entry.vector)))
            .collect();

        ranked.sort_by(|left, right| right.1.total_cmp(&left.1));

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(position, _)| self.entries[position].chunk.clone())
            .collect())
    }
}

fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm: f32 = left.iter().map(|a| a * a).sum::<f32>().sqrt();
    let right_norm: f32 = right.iter().map(|b| b * b).sum::<f32>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

#[cfg(test)]
mod tests {
    use super::{VectorStore, CHUNK_ARTIFACT, VECTOR_ARTIFACT};
    use crate::embeddings::{Embedder, HashEmbedder};
    use crate::error::{EmbeddingError, PersistError, QueryError};
    use crate::models::{Chunk, DocumentMetadata};
    use std::fs;
    use tempfile::tempdir;

    fn chunk(text: &str, page: u32) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: DocumentMetadata {
                source: "/tmp/doc.pdf".to_string(),
                page,
                checksum: "checksum".to_string(),
            },
        }
    }

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            chunk("hydraulic pumps and pressure ratings", 1),
            chunk("cooking recipes with garlic and olive oil", 2),
            chunk("annual report of fiscal results", 3),
        ]
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            8
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Backend {
                status: 503,
                details: "unavailable".to_string(),
            })
        }
    }

    struct WrongDimensionEmbedder;

    impl Embedder for WrongDimensionEmbedder {
        fn dimensions(&self) -> usize {
            8
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![0.5; 4])
        }
    }

    #[test]
    fn search_ranks_the_matching_chunk_first() {
        let store = VectorStore::build(sample_chunks(), HashEmbedder::default()).unwrap();
        let hits = store
            .search("hydraulic pumps and pressure ratings", 2)
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "hydraulic pumps and pressure ratings");
    }

    #[test]
    fn top_k_larger_than_index_returns_everything() {
        let store = VectorStore::build(sample_chunks(), HashEmbedder::default()).unwrap();
        let hits = store.search("anything", 50).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn provider_failure_aborts_the_build() {
        let result = VectorStore::build(sample_chunks(), FailingEmbedder);
        assert!(matches!(result, Err(EmbeddingError::Backend { .. })));
    }

    #[test]
    fn wrong_dimension_vector_aborts_the_build() {
        let result = VectorStore::build(sample_chunks(), WrongDimensionEmbedder);
        assert!(matches!(
            result,
            Err(EmbeddingError::MalformedVector {
                expected: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let store = VectorStore::build(sample_chunks(), HashEmbedder::default()).unwrap();
        assert!(matches!(
            store.search("query", 0),
            Err(QueryError::InvalidTopK)
        ));
    }

    #[test]
    fn empty_index_rejects_searches() {
        let store = VectorStore::build(Vec::new(), HashEmbedder::default()).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.search("query", 1),
            Err(QueryError::EmptyIndex)
        ));
    }

    #[test]
    fn round_trip_search_matches_the_in_memory_index() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = VectorStore::build(sample_chunks(), HashEmbedder::default())?;
        store.persist(dir.path())?;

        let reloaded = VectorStore::load(dir.path(), HashEmbedder::default())?;
        assert_eq!(reloaded.len(), store.len());

        for query in ["hydraulic pressure", "garlic oil", "fiscal report"] {
            let before = store.search(query, 3)?;
            let after = reloaded.search(query, 3)?;
            assert_eq!(before, after);
        }
        Ok(())
    }

    #[test]
    fn empty_index_survives_a_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = VectorStore::build(Vec::new(), HashEmbedder::default())?;
        store.persist(dir.path())?;

        let reloaded = VectorStore::load(dir.path(), HashEmbedder::default())?;
        assert!(reloaded.is_empty());
        assert!(matches!(
            reloaded.search("query", 1),
            Err(QueryError::EmptyIndex)
        ));
        Ok(())
    }

    #[test]
    fn persist_creates_both_artifacts_and_no_leftover_temp_files(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let target = dir.path().join("nested").join("index");
        let store = VectorStore::build(sample_chunks(), HashEmbedder::default())?;
        store.persist(&target)?;

        assert!(target.join(VECTOR_ARTIFACT).is_file());
        assert!(target.join(CHUNK_ARTIFACT).is_file());
        assert!(!target.join(format!("{VECTOR_ARTIFACT}.tmp")).exists());
        assert!(!target.join(format!("{CHUNK_ARTIFACT}.tmp")).exists());
        Ok(())
    }

    #[test]
    fn loading_from_an_empty_folder_reports_the_missing_artifact(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = VectorStore::load(dir.path(), HashEmbedder::default());
        assert!(matches!(result, Err(PersistError::MissingArtifact(_))));
        Ok(())
    }

    #[test]
    fn corrupt_artifact_fails_to_load() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = VectorStore::build(sample_chunks(), HashEmbedder::default())?;
        store.persist(dir.path())?;
        fs::write(dir.path().join(VECTOR_ARTIFACT), b"not json at all")?;

        let result = VectorStore::load(dir.path(), HashEmbedder::default());
        assert!(matches!(result, Err(PersistError::Serialization(_))));
        Ok(())
    }

    #[test]
    fn embedder_dimensions_must_match_the_stored_index() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        let store = VectorStore::build(sample_chunks(), HashEmbedder { dimensions: 64 })?;
        store.persist(dir.path())?;

        let result = VectorStore::load(dir.path(), HashEmbedder { dimensions: 32 });
        assert!(matches!(
            result,
            Err(PersistError::DimensionMismatch {
                stored: 64,
                embedder: 32
            })
        ));
        Ok(())
    }
}
