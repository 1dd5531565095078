use crate::error::EmbeddingError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const GEMINI_EMBEDDING_MODEL: &str = "models/embedding-001";
pub const GEMINI_EMBEDDING_DIMENSIONS: usize = 768;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub trait Embedder {
    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Sequential by default; output order matches input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: ContentParts<'a>,
}

#[derive(Debug, Clone, Serialize)]
struct ContentParts<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Blocking client for the Google Generative Language embedding endpoint.
/// The credential is injected at construction; nothing reads the
/// environment after startup.
pub struct GeminiEmbedder {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
            model: GEMINI_EMBEDDING_MODEL.to_string(),
            dimensions: GEMINI_EMBEDDING_DIMENSIONS,
        }
    }

    /// Reads `GOOGLE_API_KEY` once at startup.
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(EmbeddingError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl Embedder for GeminiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let payload = EmbedContentRequest {
            model: &self.model,
            content: ContentParts {
                parts: vec![TextPart { text }],
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/{}:embedContent?key={}",
                self.api_base, self.model, self.api_key
            ))
            .json(&payload)
            .send()?;

        if !response.status().is_success() {
            return Err(EmbeddingError::Backend {
                status: response.status().as_u16(),
                details: response.text().unwrap_or_default(),
            });
        }

        let parsed: EmbedContentResponse = response.json()?;
        let vector = parsed.embedding.values;

        if vector.len() != self.dimensions {
            return Err(EmbeddingError::MalformedVector {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}

/// Deterministic offline embedder hashing character trigrams into a
/// unit-normalized vector. Useful for tests and air-gapped runs; not a
/// semantic model.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    pub dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dimensions: 128 }
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return Ok(vector);
        }

        for window in chars.windows(3) {
            let mut hash = 1469598103934665603u64;
            for character in window {
                let mut buffer = [0u8; 4];
                for byte in character.encode_utf8(&mut buffer).bytes() {
                    hash ^= u64::from(byte);
                    hash = hash.wrapping_mul(1099511628211);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }
}
