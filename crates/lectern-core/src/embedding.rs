//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding providers (e.g., Ollama, a local hashing embedder)
///
/// An embedding provider maps text strings to fixed-length numeric vectors.
/// Output order matches input order, one vector per input text, and every
/// vector has `dimension()` components for the lifetime of the provider
/// instance. Mixing vectors from providers with different dimensionality is
/// a caller error and is rejected at query time.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, preserving input order.
    ///
    /// Fails with [`Error::EmbeddingProvider`](crate::Error::EmbeddingProvider)
    /// on network or model failure.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Fixed output dimensionality of this provider instance.
    fn dimension(&self) -> usize;
}
