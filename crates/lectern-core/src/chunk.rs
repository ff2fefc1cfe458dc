//! Chunk record types
//!
//! A chunk is the unit of retrievable lecture content. Chunks carry their
//! provenance: which lecture they came from, where in it they sit, what kind
//! of content they hold, and which ingestion path produced them.

use serde::{Deserialize, Serialize};

/// What a chunk's text contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Content split out of a slide boundary or section marker.
    SlideContent,
    /// Content from the blank-line paragraph fallback split.
    ParagraphFallback,
    /// A key concept from a curated study guide.
    StructuredConcept,
    Definition,
    Formula,
    Algorithm,
    Example,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::SlideContent => "slide_content",
            ChunkKind::ParagraphFallback => "paragraph_fallback",
            ChunkKind::StructuredConcept => "structured_concept",
            ChunkKind::Definition => "definition",
            ChunkKind::Formula => "formula",
            ChunkKind::Algorithm => "algorithm",
            ChunkKind::Example => "example",
        }
    }
}

/// Which ingestion path produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSource {
    /// Plain lecture text extracted upstream (OCR or otherwise).
    ExtractedText,
    /// A hand-maintained study guide.
    CuratedGuide,
}

impl ChunkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkSource::ExtractedText => "extracted_text",
            ChunkSource::CuratedGuide => "curated_guide",
        }
    }
}

/// A unit of retrievable lecture content with provenance metadata.
///
/// `id` is unique within a store and `(lecture, sequence_number)` is unique
/// per chunk; `sequence_number` is 1-based within its lecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub lecture: String,
    pub sequence_number: usize,
    pub text: String,
    pub kind: ChunkKind,
    pub source: ChunkSource,
}

impl Chunk {
    /// Create a chunk, deriving its id from the lecture name and position.
    pub fn new(
        lecture: impl Into<String>,
        sequence_number: usize,
        text: impl Into<String>,
        kind: ChunkKind,
        source: ChunkSource,
    ) -> Self {
        let lecture = lecture.into();
        Self {
            id: format!("{}-{}", lecture, sequence_number),
            lecture,
            sequence_number,
            text: text.into(),
            kind,
            source,
        }
    }
}
