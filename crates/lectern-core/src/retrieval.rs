//! Retrieval configuration and result types

use serde::{Deserialize, Serialize};

use crate::Chunk;

/// How the retriever scores chunks against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceMode {
    /// Cosine similarity between the query embedding and stored embeddings.
    Semantic,
    /// Keyword-overlap counting, no embedding call. Fallback path for a
    /// text-only deployment; same interface contract and ordering rules.
    Keyword,
}

/// Configuration for a retrieval call.
///
/// The defaults (top-k 5, threshold 0.1) are empirically chosen for a small
/// corpus and carry no documented derivation; treat them as tunables rather
/// than behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub min_score: f32,
    pub mode: RelevanceMode,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: 0.1,
            mode: RelevanceMode::Semantic,
        }
    }
}

/// A chunk paired with its relevance score for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
