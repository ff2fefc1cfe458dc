//! Vector store and snapshot persistence
//!
//! The store owns the paired (chunk list, embedding matrix) snapshot. A
//! snapshot is built once per corpus change and replaced wholesale; callers
//! never mutate it in place, so a query can never observe more chunks than
//! embeddings or vice versa.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lectern_core::{Chunk, EmbeddingProvider, Error, Result};

const CHUNKS_FILE: &str = "chunks.json";
const EMBEDDINGS_FILE: &str = "embeddings.json";

/// Default embedding batch size. Batching bounds peak memory against the
/// provider and gives natural progress boundaries.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// The paired, immutable (chunks, embeddings) state at a point in time.
///
/// Index `i` of the embedding matrix always corresponds to index `i` of the
/// chunk list; the two are never reordered independently.
#[derive(Debug, Clone)]
pub struct Snapshot {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    fn new(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Store(format!(
                "snapshot is inconsistent: {} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let mut seen = HashSet::new();
        for chunk in &chunks {
            if !seen.insert(chunk.id.as_str()) {
                return Err(Error::Store(format!("duplicate chunk id '{}'", chunk.id)));
            }
        }
        Ok(Self { chunks, embeddings })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Dimensionality of the stored embedding space, if any chunks exist.
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }

    pub fn stats(&self) -> IndexStats {
        let mut per_lecture = BTreeMap::new();
        let mut per_kind = BTreeMap::new();
        for chunk in &self.chunks {
            *per_lecture.entry(chunk.lecture.clone()).or_insert(0) += 1;
            *per_kind.entry(chunk.kind.as_str().to_string()).or_insert(0) += 1;
        }
        IndexStats {
            chunk_count: self.chunks.len(),
            lecture_count: per_lecture.len(),
            per_lecture,
            per_kind,
        }
    }
}

/// Index statistics for display and staleness inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub chunk_count: usize,
    pub lecture_count: usize,
    pub per_lecture: BTreeMap<String, usize>,
    pub per_kind: BTreeMap<String, usize>,
}

/// Builds, persists, and reloads snapshots for one corpus.
///
/// The data directory is the corpus key: the chunk records and the embedding
/// matrix live side by side in it and are always read and written together.
pub struct VectorStore {
    data_dir: PathBuf,
    batch_size: usize,
}

impl VectorStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn chunks_path(&self) -> PathBuf {
        self.data_dir.join(CHUNKS_FILE)
    }

    fn embeddings_path(&self) -> PathBuf {
        self.data_dir.join(EMBEDDINGS_FILE)
    }

    /// Embed every chunk and assemble a fresh snapshot.
    ///
    /// All-or-nothing: a failed batch discards everything already embedded
    /// and surfaces an error naming the batch, so an inconsistent index can
    /// never come out of a build.
    pub async fn build(
        &self,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Snapshot> {
        if chunks.is_empty() {
            return Ok(Snapshot::empty());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let total_batches = texts.len().div_ceil(self.batch_size);
        let mut embeddings = Vec::with_capacity(chunks.len());

        for (batch_index, batch) in texts.chunks(self.batch_size).enumerate() {
            let vectors = provider.embed(batch).await.map_err(|e| {
                let reason = match e {
                    Error::EmbeddingProvider(msg) => msg,
                    other => other.to_string(),
                };
                Error::EmbeddingProvider(format!(
                    "batch {} of {}: {}",
                    batch_index + 1,
                    total_batches,
                    reason
                ))
            })?;

            if vectors.len() != batch.len() {
                return Err(Error::EmbeddingProvider(format!(
                    "batch {} of {}: expected {} vectors, got {}",
                    batch_index + 1,
                    total_batches,
                    batch.len(),
                    vectors.len()
                )));
            }
            if let Some(bad) = vectors.iter().find(|v| v.len() != provider.dimension()) {
                return Err(Error::EmbeddingProvider(format!(
                    "batch {} of {}: provider returned a {}-dimensional vector, expected {}",
                    batch_index + 1,
                    total_batches,
                    bad.len(),
                    provider.dimension()
                )));
            }
            embeddings.extend(vectors);

            if total_batches > 1 && (batch_index + 1) % 10 == 0 {
                println!("   embedded {}/{} chunks", embeddings.len(), texts.len());
            }
        }

        Snapshot::new(chunks, embeddings)
    }

    /// Return the persisted snapshot when its chunk count matches the
    /// corpus, otherwise discard it and rebuild.
    ///
    /// The count comparison is a deliberately coarse staleness check; a cache
    /// hit makes no embedding-provider call at all. A rebuild that cannot be
    /// persisted is reported as a warning and the in-memory snapshot is still
    /// returned, usable for the current session.
    pub async fn load_or_build(
        &self,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Snapshot> {
        match self.load() {
            Ok(Some(snapshot)) if snapshot.len() == chunks.len() => return Ok(snapshot),
            Ok(_) => {}
            Err(e) => eprintln!("warning: discarding unreadable snapshot: {e}"),
        }

        let snapshot = self.build(chunks, provider).await?;
        if let Err(e) = self.persist(&snapshot) {
            eprintln!("warning: snapshot could not be persisted: {e}");
        }
        Ok(snapshot)
    }

    /// Write the snapshot's two artifacts as a single atomic unit.
    ///
    /// Both payloads are staged to temporary files before either final name
    /// is touched, so a failed write updates neither artifact and a loader
    /// can never pair a chunk list with a foreign embedding matrix.
    pub fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;

        let chunks_json = serde_json::to_string_pretty(snapshot.chunks())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let embeddings_json = serde_json::to_string(snapshot.embeddings())
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let chunks_tmp = staging_path(&self.chunks_path());
        let embeddings_tmp = staging_path(&self.embeddings_path());
        fs::write(&chunks_tmp, chunks_json)?;
        fs::write(&embeddings_tmp, embeddings_json)?;

        fs::rename(&chunks_tmp, self.chunks_path())?;
        fs::rename(&embeddings_tmp, self.embeddings_path())?;
        Ok(())
    }

    /// Read the persisted snapshot, if both artifacts are present and agree.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let chunks_path = self.chunks_path();
        let embeddings_path = self.embeddings_path();
        if !chunks_path.exists() || !embeddings_path.exists() {
            return Ok(None);
        }

        let chunks: Vec<Chunk> = serde_json::from_str(&fs::read_to_string(&chunks_path)?)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let embeddings: Vec<Vec<f32>> =
            serde_json::from_str(&fs::read_to_string(&embeddings_path)?)
                .map_err(|e| Error::Serialization(e.to_string()))?;

        Snapshot::new(chunks, embeddings).map(Some)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lectern_core::{ChunkKind, ChunkSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        dimension: usize,
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; self.dimension];
                    v[t.len() % self.dimension] = 1.0;
                    v
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    fn sample_chunks(n: usize) -> Vec<Chunk> {
        (1..=n)
            .map(|i| {
                Chunk::new(
                    "intro",
                    i,
                    format!("chunk number {i} with enough text to be plausible"),
                    ChunkKind::SlideContent,
                    ChunkSource::ExtractedText,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_build_pairs_every_chunk_with_a_vector() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path());
        let embedder = CountingEmbedder::new(8);

        let snapshot = store.build(sample_chunks(5), &embedder).await.unwrap();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.embeddings().len(), 5);
        assert_eq!(snapshot.dimension(), Some(8));
    }

    #[tokio::test]
    async fn test_build_batches_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path()).with_batch_size(2);
        let embedder = CountingEmbedder::new(8);

        store.build(sample_chunks(5), &embedder).await.unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_corpus_builds_empty_snapshot_without_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path());
        let embedder = CountingEmbedder::new(8);

        let snapshot = store.build(Vec::new(), &embedder).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persist_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path());
        let embedder = CountingEmbedder::new(8);

        let snapshot = store.build(sample_chunks(3), &embedder).await.unwrap();
        store.persist(&snapshot).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.chunks()[1].id, snapshot.chunks()[1].id);
        assert_eq!(loaded.embeddings(), snapshot.embeddings());
    }

    #[tokio::test]
    async fn test_load_or_build_hits_cache_without_provider_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path());
        let embedder = CountingEmbedder::new(8);

        store
            .load_or_build(sample_chunks(4), &embedder)
            .await
            .unwrap();
        let first_calls = embedder.calls.load(Ordering::SeqCst);
        assert!(first_calls > 0);

        let again = store
            .load_or_build(sample_chunks(4), &embedder)
            .await
            .unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), first_calls);
        assert_eq!(again.len(), 4);
    }

    #[tokio::test]
    async fn test_changed_chunk_count_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path());
        let embedder = CountingEmbedder::new(8);

        store
            .load_or_build(sample_chunks(4), &embedder)
            .await
            .unwrap();
        let first_calls = embedder.calls.load(Ordering::SeqCst);

        // A lecture was added; the persisted count no longer matches.
        let snapshot = store
            .load_or_build(sample_chunks(6), &embedder)
            .await
            .unwrap();
        assert!(embedder.calls.load(Ordering::SeqCst) > first_calls);
        assert_eq!(snapshot.len(), 6);
        assert_eq!(store.load().unwrap().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_mismatched_artifacts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path());
        let embedder = CountingEmbedder::new(8);

        let snapshot = store.build(sample_chunks(3), &embedder).await.unwrap();
        store.persist(&snapshot).unwrap();

        // Truncate the embedding matrix behind the store's back.
        fs::write(dir.path().join(EMBEDDINGS_FILE), "[[1.0, 0.0]]").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_stats_breakdown() {
        let mut chunks = sample_chunks(2);
        chunks.push(Chunk::new(
            "indexing",
            1,
            "an inverted index maps terms to posting lists",
            ChunkKind::Definition,
            ChunkSource::CuratedGuide,
        ));
        let embeddings = vec![vec![0.0; 4]; 3];
        let snapshot = Snapshot::new(chunks, embeddings).unwrap();

        let stats = snapshot.stats();
        assert_eq!(stats.chunk_count, 3);
        assert_eq!(stats.lecture_count, 2);
        assert_eq!(stats.per_lecture["intro"], 2);
        assert_eq!(stats.per_lecture["indexing"], 1);
        assert_eq!(stats.per_kind["definition"], 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let chunks = vec![
            Chunk::new("a", 1, "x", ChunkKind::SlideContent, ChunkSource::ExtractedText),
            Chunk::new("a", 1, "y", ChunkKind::SlideContent, ChunkSource::ExtractedText),
        ];
        assert!(Snapshot::new(chunks, vec![vec![0.0]; 2]).is_err());
    }
}
