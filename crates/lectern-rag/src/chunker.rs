//! Lecture text chunker
//!
//! Splits raw lecture text into addressable chunks by trying a sequence of
//! structural split patterns in priority order, falling back to blank-line
//! paragraphs when no marker pattern matches.
//!
//! This is best-effort heuristic segmentation, not a guaranteed semantic
//! boundary: two structurally-unrelated ideas can land in one chunk, and one
//! idea can be split across two.

use regex::Regex;

use lectern_core::{Chunk, ChunkKind, ChunkSource};

/// Configuration for the chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Fragments whose trimmed length does not exceed this are discarded.
    pub min_chunk_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { min_chunk_chars: 50 }
    }
}

/// Splits lecture text into ordered [`Chunk`]s.
pub struct Chunker {
    config: ChunkerConfig,
    patterns: Vec<Regex>,
}

/// Structural split patterns, in priority order: explicit slide-boundary
/// markers in their known textual forms, then numbered-section markers, then
/// title-like line markers.
const SPLIT_PATTERNS: &[&str] = &[
    r"(?i)--- Slide \d+ ---",
    r"(?i)=== Slide \d+ ===",
    r"(?i)Slide \d+:",
    r"\n\n\d+\.\s",
    r"\n\n[A-Z][^.\n]*:\n",
];

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        let patterns = SPLIT_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("split patterns are valid"))
            .collect();
        Self { config, patterns }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `raw_text` into chunks attributed to `lecture`.
    ///
    /// The first pattern that yields more than one fragment wins; the first
    /// fragment of a marker split is preamble and is discarded. Retained
    /// fragments are numbered 1-based among themselves.
    pub fn chunk(&self, raw_text: &str, lecture: &str) -> Vec<Chunk> {
        for pattern in &self.patterns {
            let parts: Vec<&str> = pattern.split(raw_text).collect();
            if parts.len() > 1 {
                return self.collect(
                    parts.into_iter().skip(1),
                    lecture,
                    ChunkKind::SlideContent,
                );
            }
        }

        self.collect(
            raw_text.split("\n\n"),
            lecture,
            ChunkKind::ParagraphFallback,
        )
    }

    fn collect<'a>(
        &self,
        fragments: impl Iterator<Item = &'a str>,
        lecture: &str,
        kind: ChunkKind,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for fragment in fragments {
            let trimmed = fragment.trim();
            if trimmed.chars().count() > self.config.min_chunk_chars {
                let sequence_number = chunks.len() + 1;
                chunks.push(Chunk::new(
                    lecture,
                    sequence_number,
                    trimmed,
                    kind,
                    ChunkSource::ExtractedText,
                ));
            }
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}
