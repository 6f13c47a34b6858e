//! Embedding client used by keyword ranking.
//!
//! Keyword extraction only needs relative similarity between a document and short candidate
//! phrases, so the default client derives deterministic vectors from byte content. The trait
//! seam allows swapping in a real embedding provider without touching the ranker.

use crate::config::get_config;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Deterministic embedding client hashing byte content into a fixed-dimension vector.
pub struct DeterministicEmbedder;

impl DeterministicEmbedder {
    /// Construct a new deterministic embedding client instance.
    pub const fn new() -> Self {
        Self
    }

    // FNV-1a over the byte stream; each step scatters its hash state into one slot. The
    // running state makes slot choice depend on every byte seen so far, so anagrams and
    // shifted phrases land in different buckets.
    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        const FNV_OFFSET: u32 = 0x811c_9dc5;
        const FNV_PRIME: u32 = 0x0100_0193;

        let mut embedding = vec![0.0_f32; dimension];
        let mut state = FNV_OFFSET;

        for byte in text.bytes() {
            state = (state ^ u32::from(byte)).wrapping_mul(FNV_PRIME);
            let slot = state as usize % dimension;
            // Weight stays above 1 so non-empty input always has a nonzero norm.
            embedding[slot] += 1.0 + f32::from((state >> 16) as u8) / 255.0;
        }

        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

impl Default for DeterministicEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingClient for DeterministicEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let dimension = get_config().embedding_dimension;

        if dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        let embeddings = texts
            .into_iter()
            .map(|text| Self::encode(&text, dimension))
            .collect();

        Ok(embeddings)
    }
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client() -> Box<dyn EmbeddingClient + Send + Sync> {
    Box::new(DeterministicEmbedder::new())
}
