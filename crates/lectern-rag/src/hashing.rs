//! Deterministic hashing embedder
//!
//! Maps text into a fixed-length vector from word and bigram hash features,
//! position-weighted and L2-normalized. No model download, no network: this
//! is the low-dependency deployment mode and the test workhorse. Semantic
//! quality is what hash overlap buys — shared words, not shared meaning.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use lectern_core::{EmbeddingProvider, Result};

pub const DEFAULT_DIMENSION: usize = 384;

/// Hash-feature [`EmbeddingProvider`].
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let mut embedding = vec![0.0f32; self.dimension];

        // Word features: three hash-derived indices per word, weighted so
        // earlier words count more.
        for (pos, word) in words.iter().enumerate() {
            let hash = Self::hash_of(word);

            let idx1 = (hash % self.dimension as u64) as usize;
            let idx2 = ((hash >> 16) % self.dimension as u64) as usize;
            let idx3 = ((hash >> 32) % self.dimension as u64) as usize;

            let position_weight = 1.0 / (pos as f32 + 1.0);

            embedding[idx1] += position_weight;
            embedding[idx2] += position_weight * 0.7;
            embedding[idx3] += position_weight * 0.5;
        }

        // Bigram features capture some word order.
        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            let idx = (Self::hash_of(&bigram) % self.dimension as u64) as usize;
            embedding[idx] += 0.8;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        embedding
    }

    fn hash_of(token: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
