//! End-to-end scenarios across chunker, store, and retriever.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use lectern_core::{EmbeddingProvider, Error, Result, RetrievalConfig};

use crate::chunker::Chunker;
use crate::hashing::HashingEmbedder;
use crate::retriever::Retriever;
use crate::store::VectorStore;

const INTRO_TEXT: &str = "\
Course header, unused preamble.
--- Slide 1 ---
Course logistics: grading splits homework, exams, and participation across the semester calendar.
--- Slide 2 ---
Instructors and teaching assistants hold weekly office hours in the engineering lab building.
--- Slide 3 ---
We cover crawling, ranking, and evaluation of retrieval systems over the whole semester.
";

const INDEXING_TEXT: &str = "\
Preamble before the first marker.
--- Slide 1 ---
An inverted index maps each term to a posting list of the documents containing that term, supporting fast boolean retrieval.
--- Slide 2 ---
Building an inverted index: tokenize documents, sort the term-document pairs, and group them into posting lists.
";

struct FlakyEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
    fail_on_call: usize,
}

impl FlakyEmbedder {
    fn new(fail_on_call: usize) -> Self {
        Self {
            inner: HashingEmbedder::default(),
            calls: AtomicUsize::new(0),
            fail_on_call,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(Error::EmbeddingProvider("simulated quota failure".to_string()));
        }
        self.inner.embed(texts).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

fn corpus_chunks() -> Vec<lectern_core::Chunk> {
    let chunker = Chunker::default();
    let mut chunks = chunker.chunk(INTRO_TEXT, "intro");
    chunks.extend(chunker.chunk(INDEXING_TEXT, "indexing"));
    chunks
}

#[tokio::test]
async fn test_two_lecture_corpus_builds_matched_pairs_and_ranks_by_topic() {
    let chunks = corpus_chunks();
    assert_eq!(chunks.len(), 5);

    let dir = tempfile::tempdir().unwrap();
    let embedder = Arc::new(HashingEmbedder::default());
    let store = VectorStore::new(dir.path());
    let snapshot = store.build(chunks.clone(), embedder.as_ref()).await.unwrap();

    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot.embeddings().len(), 5);
    // Embeddings sit in the same order as their chunks.
    let direct = embedder
        .embed(&[chunks[3].text.clone()])
        .await
        .unwrap()
        .remove(0);
    assert_eq!(snapshot.embeddings()[3], direct);

    let retriever = Retriever::new(Arc::new(snapshot), embedder);
    let config = RetrievalConfig {
        top_k: 2,
        ..Default::default()
    };
    let results = retriever
        .search("what is an inverted index", &config)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.len() <= 2);
    assert!(
        results.iter().all(|r| r.chunk.lecture == "indexing"),
        "indexing chunks should outrank unrelated intro chunks: {:?}",
        results
            .iter()
            .map(|r| (&r.chunk.lecture, r.score))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_empty_corpus_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = Arc::new(HashingEmbedder::default());
    let store = VectorStore::new(dir.path());

    let snapshot = store
        .build(Chunker::default().chunk("", "nothing"), embedder.as_ref())
        .await
        .unwrap();
    assert!(snapshot.is_empty());

    let retriever = Retriever::new(Arc::new(snapshot), embedder);
    let config = RetrievalConfig {
        top_k: 5,
        ..Default::default()
    };
    let results = retriever.search("anything at all", &config).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_repeated_load_or_build_is_a_cache_hit_with_identical_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = FlakyEmbedder::new(usize::MAX);
    let store = VectorStore::new(dir.path());

    let first = store
        .load_or_build(corpus_chunks(), &embedder)
        .await
        .unwrap();
    let calls_after_first = embedder.calls.load(Ordering::SeqCst);

    let second = store
        .load_or_build(corpus_chunks(), &embedder)
        .await
        .unwrap();

    // No second embedding-provider call, and the snapshot is identical.
    assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_first);
    let ids = |s: &crate::store::Snapshot| {
        s.chunks().iter().map(|c| c.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.embeddings(), second.embeddings());
}

#[tokio::test]
async fn test_failed_batch_leaves_previous_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = VectorStore::new(dir.path()).with_batch_size(2);

    let good = HashingEmbedder::default();
    let initial = store
        .build(corpus_chunks()[..2].to_vec(), &good)
        .await
        .unwrap();
    store.persist(&initial).unwrap();

    // Second batch of the rebuild fails; the build is all-or-nothing.
    let flaky = FlakyEmbedder::new(2);
    let err = store
        .load_or_build(corpus_chunks(), &flaky)
        .await
        .unwrap_err();
    match err {
        Error::EmbeddingProvider(msg) => {
            assert!(msg.contains("batch 2 of 3"), "unhelpful message: {msg}");
            assert!(msg.contains("simulated quota failure"));
        }
        other => panic!("expected EmbeddingProvider error, got {other:?}"),
    }

    // The persisted snapshot is still the pre-failure one.
    let on_disk = store.load().unwrap().unwrap();
    assert_eq!(on_disk.len(), 2);
}
