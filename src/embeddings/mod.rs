// Embeddings module
// This module handles embedding generation for documentation chunks and
// search queries

pub mod ollama;

pub use ollama::{DEFAULT_EMBEDDING_DIMENSION, OllamaClient};

use anyhow::Result;

/// Produces vector embeddings for documentation chunks and search queries.
///
/// The Ollama client is the production implementation; tests substitute a
/// deterministic embedder so they can run without a model server.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the vectors produced by this embedder
    fn dimension(&self) -> usize;
}

impl Embedder for OllamaClient {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_embeddings_batch(texts)
    }

    #[inline]
    fn dimension(&self) -> usize {
        self.embedding_dimension() as usize
    }
}
