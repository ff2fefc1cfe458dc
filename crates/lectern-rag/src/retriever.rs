//! Similarity retriever
//!
//! Ranks stored chunks against a query. Semantic mode embeds the query with
//! the same provider that built the store and scores by cosine similarity;
//! keyword mode counts query-word occurrences and needs no provider call.
//! Both modes share the ranking contract: descending score, ties broken by
//! ascending sequence number, at most `top_k` results, and nothing at or
//! below the relevance threshold.

use std::cmp::Ordering;
use std::sync::Arc;

use lectern_core::{
    EmbeddingProvider, Error, RelevanceMode, Result, RetrievalConfig, ScoredChunk,
};

use crate::store::Snapshot;

/// Query words this short are ignored by keyword scoring.
const KEYWORD_MIN_WORD_CHARS: usize = 3;

/// Ranks chunks from one snapshot against queries.
///
/// The snapshot is shared read-only; replacing it swaps the whole pair of
/// chunk list and embedding matrix at once, so a search never sees a
/// half-rebuilt index.
pub struct Retriever {
    snapshot: Arc<Snapshot>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(snapshot: Arc<Snapshot>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { snapshot, embedder }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Swap in a freshly built snapshot.
    pub fn replace_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        self.snapshot = snapshot;
    }

    /// Rank chunks against `query`, best first.
    ///
    /// An empty store yields an empty result without touching the provider.
    pub async fn search(&self, query: &str, config: &RetrievalConfig) -> Result<Vec<ScoredChunk>> {
        if config.top_k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }
        if self.snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let scores = match config.mode {
            RelevanceMode::Semantic => self.semantic_scores(query).await?,
            RelevanceMode::Keyword => self.keyword_scores(query),
        };

        let chunks = self.snapshot.chunks();
        let mut results: Vec<ScoredChunk> = scores
            .into_iter()
            .filter(|(_, score)| *score > config.min_score)
            .map(|(i, score)| ScoredChunk {
                chunk: chunks[i].clone(),
                score,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.sequence_number.cmp(&b.chunk.sequence_number))
        });
        results.truncate(config.top_k);
        Ok(results)
    }

    async fn semantic_scores(&self, query: &str) -> Result<Vec<(usize, f32)>> {
        let vectors = self.embedder.embed(&[query.to_string()]).await?;
        let query_vector = vectors.into_iter().next().ok_or_else(|| {
            Error::EmbeddingProvider("provider returned no vector for the query".to_string())
        })?;

        if let Some(expected) = self.snapshot.dimension() {
            if query_vector.len() != expected {
                return Err(Error::EmbeddingSpaceMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        Ok(self
            .snapshot
            .embeddings()
            .iter()
            .map(|embedding| cosine_similarity(&query_vector, embedding))
            .enumerate()
            .collect())
    }

    fn keyword_scores(&self, query: &str) -> Vec<(usize, f32)> {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .filter(|w| w.chars().count() > KEYWORD_MIN_WORD_CHARS)
            .collect();

        self.snapshot
            .chunks()
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let text = chunk.text.to_lowercase();
                let hits: usize = words.iter().map(|w| text.matches(w).count()).sum();
                (i, hits as f32)
            })
            .collect()
    }
}

/// Cosine similarity between two vectors; zero when either has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingEmbedder;
    use crate::store::VectorStore;
    use async_trait::async_trait;
    use lectern_core::{Chunk, ChunkKind, ChunkSource};

    /// Embeds the query into a fixed dimension regardless of the store, to
    /// provoke space mismatches.
    struct FixedDimEmbedder(usize);

    #[async_trait]
    impl EmbeddingProvider for FixedDimEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0; self.0]).collect())
        }

        fn dimension(&self) -> usize {
            self.0
        }
    }

    fn chunk(lecture: &str, seq: usize, text: &str) -> Chunk {
        Chunk::new(
            lecture,
            seq,
            text,
            ChunkKind::SlideContent,
            ChunkSource::ExtractedText,
        )
    }

    async fn indexed_retriever(chunks: Vec<Chunk>) -> Retriever {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(HashingEmbedder::default());
        let snapshot = VectorStore::new(dir.path())
            .build(chunks, embedder.as_ref())
            .await
            .unwrap();
        Retriever::new(Arc::new(snapshot), embedder)
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let retriever = Retriever::new(
            Arc::new(Snapshot::empty()),
            Arc::new(HashingEmbedder::default()),
        );
        let results = retriever
            .search("anything", &RetrievalConfig::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_top_k_is_rejected() {
        let retriever = Retriever::new(
            Arc::new(Snapshot::empty()),
            Arc::new(HashingEmbedder::default()),
        );
        let config = RetrievalConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(retriever.search("anything", &config).await.is_err());
    }

    #[tokio::test]
    async fn test_results_sorted_and_above_threshold() {
        let retriever = indexed_retriever(vec![
            chunk("indexing", 1, "an inverted index maps every term to the list of documents containing it"),
            chunk("indexing", 2, "posting lists in an inverted index are sorted by document identifier"),
            chunk("intro", 3, "the course grading policy covers homework exams and participation"),
        ])
        .await;

        let config = RetrievalConfig::default();
        let results = retriever
            .search("how does an inverted index work", &config)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results.len() <= config.top_k);
        assert!(results.iter().all(|r| r.score > config.min_score));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_top_k_caps_results() {
        let retriever = indexed_retriever(vec![
            chunk("indexing", 1, "inverted index term dictionary posting list construction"),
            chunk("indexing", 2, "inverted index compression and posting list skips"),
            chunk("indexing", 3, "inverted index merging for dynamic collections"),
        ])
        .await;

        let config = RetrievalConfig {
            top_k: 2,
            ..Default::default()
        };
        let results = retriever.search("inverted index", &config).await.unwrap();
        assert!(results.len() <= 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_fast() {
        let store_embedder = Arc::new(HashingEmbedder::new(32));
        let dir = tempfile::tempdir().unwrap();
        let snapshot = VectorStore::new(dir.path())
            .build(
                vec![chunk("intro", 1, "a chunk with enough text to stand in for a slide")],
                store_embedder.as_ref(),
            )
            .await
            .unwrap();

        let retriever = Retriever::new(Arc::new(snapshot), Arc::new(FixedDimEmbedder(8)));
        let err = retriever
            .search("query", &RetrievalConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::EmbeddingSpaceMismatch {
                expected: 32,
                actual: 8
            }
        ));
    }

    #[tokio::test]
    async fn test_keyword_mode_counts_occurrences_and_skips_short_words() {
        let retriever = indexed_retriever(vec![
            chunk("indexing", 1, "index index index construction"),
            chunk("indexing", 2, "index construction"),
            chunk("intro", 3, "course overview and logistics"),
        ])
        .await;

        let config = RetrievalConfig {
            mode: RelevanceMode::Keyword,
            ..Default::default()
        };
        // "an" and "the" are too short to count; "index" drives the ranking.
        let results = retriever.search("an index the", &config).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.sequence_number, 1);
        assert_eq!(results[0].score, 3.0);
        assert_eq!(results[1].score, 1.0);
    }

    #[tokio::test]
    async fn test_keyword_ties_break_by_sequence_number() {
        let retriever = indexed_retriever(vec![
            chunk("indexing", 2, "ranking functions score documents"),
            chunk("indexing", 1, "ranking functions score documents"),
        ])
        .await;

        let config = RetrievalConfig {
            mode: RelevanceMode::Keyword,
            ..Default::default()
        };
        let results = retriever.search("ranking", &config).await.unwrap();
        let seqs: Vec<usize> = results.iter().map(|r| r.chunk.sequence_number).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let c = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &c).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }
}
