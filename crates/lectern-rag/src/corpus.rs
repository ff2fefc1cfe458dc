//! Lecture corpus ingestion
//!
//! Walks a notes directory for per-lecture text files and feeds each through
//! the [`Chunker`](crate::Chunker). A lecture that cannot be read is recorded
//! as a per-lecture failure and never aborts the rest of the corpus.
//!
//! A curated study guide (Markdown) can supplement the extracted text: H1
//! headings name the lecture, H2 headings name the category (definitions,
//! formulas, algorithms, examples, key concepts), and each list item or
//! paragraph under a category becomes one chunk. Sequence numbers continue
//! per lecture across both sources so `(lecture, sequence_number)` stays
//! unique.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use lectern_core::{Chunk, ChunkKind, ChunkSource, Error, Result};

use crate::chunker::Chunker;

/// The outcome of loading a corpus: every chunk that could be produced plus
/// an [`Error::Ingestion`] per lecture that failed.
#[derive(Debug, Default)]
pub struct CorpusLoad {
    pub chunks: Vec<Chunk>,
    pub failures: Vec<Error>,
}

/// A directory of per-lecture text files, optionally paired with a curated
/// study guide.
pub struct LectureCorpus {
    notes_dir: PathBuf,
    guide_path: Option<PathBuf>,
    chunker: Chunker,
}

impl LectureCorpus {
    pub fn new(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
            guide_path: None,
            chunker: Chunker::default(),
        }
    }

    /// Attach a curated Markdown study guide.
    pub fn with_guide(mut self, guide_path: impl Into<PathBuf>) -> Self {
        self.guide_path = Some(guide_path.into());
        self
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Load every lecture, chunk it, and fold in the curated guide if one is
    /// configured. File ordering is lexicographic so chunk order is stable
    /// across runs.
    pub fn load(&self) -> Result<CorpusLoad> {
        let mut load = CorpusLoad::default();

        if self.notes_dir.exists() {
            let mut files: Vec<PathBuf> = fs::read_dir(&self.notes_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            files.sort();

            for path in files {
                let lecture = Self::lecture_name(&path);
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        load.chunks.extend(self.chunker.chunk(&text, &lecture));
                    }
                    Err(e) => load.failures.push(Error::Ingestion {
                        lecture,
                        reason: e.to_string(),
                    }),
                }
            }
        }

        if let Some(guide_path) = &self.guide_path {
            match fs::read_to_string(guide_path) {
                Ok(text) => {
                    let mut next_seq: HashMap<String, usize> = HashMap::new();
                    for chunk in &load.chunks {
                        let entry = next_seq.entry(chunk.lecture.clone()).or_insert(0);
                        *entry = (*entry).max(chunk.sequence_number);
                    }
                    load.chunks.extend(self.parse_guide(&text, &mut next_seq));
                }
                Err(e) => load.failures.push(Error::Ingestion {
                    lecture: guide_path.display().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(load)
    }

    /// Derive the lecture identifier from a file name. The upstream slide
    /// extractor writes `<lecture>_slides_text.txt`; the suffix is dropped.
    fn lecture_name(path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        stem.strip_suffix("_slides_text")
            .map(str::to_string)
            .unwrap_or(stem)
    }

    fn parse_guide(&self, text: &str, next_seq: &mut HashMap<String, usize>) -> Vec<Chunk> {
        let min_chars = self.chunker.config().min_chunk_chars;
        let mut chunks = Vec::new();

        let mut lecture: Option<String> = None;
        let mut kind: Option<ChunkKind> = None;
        let mut in_heading = false;
        let mut in_item = false;
        let mut heading_buf = String::new();
        let mut block_buf: Option<String> = None;

        let mut flush = |buf: &mut Option<String>,
                         lecture: &Option<String>,
                         kind: &Option<ChunkKind>,
                         chunks: &mut Vec<Chunk>| {
            let Some(text) = buf.take() else { return };
            let (Some(lecture), Some(kind)) = (lecture.as_ref(), kind.as_ref()) else {
                return;
            };
            let trimmed = text.trim();
            if trimmed.chars().count() > min_chars {
                let seq = next_seq.entry(lecture.clone()).or_insert(0);
                *seq += 1;
                chunks.push(Chunk::new(
                    lecture.clone(),
                    *seq,
                    trimmed,
                    *kind,
                    ChunkSource::CuratedGuide,
                ));
            }
        };

        for event in Parser::new(text) {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    in_heading = true;
                    heading_buf.clear();
                }
                Event::End(TagEnd::Heading(level)) => {
                    in_heading = false;
                    match level {
                        HeadingLevel::H1 => {
                            lecture = Some(heading_buf.trim().to_string());
                            kind = None;
                        }
                        HeadingLevel::H2 => {
                            kind = Some(Self::kind_for_section(&heading_buf));
                        }
                        _ => {}
                    }
                }
                Event::Start(Tag::Item) => {
                    in_item = true;
                    block_buf = Some(String::new());
                }
                Event::End(TagEnd::Item) => {
                    in_item = false;
                    flush(&mut block_buf, &lecture, &kind, &mut chunks);
                }
                Event::Start(Tag::Paragraph) if !in_item => {
                    block_buf = Some(String::new());
                }
                Event::End(TagEnd::Paragraph) if !in_item => {
                    flush(&mut block_buf, &lecture, &kind, &mut chunks);
                }
                Event::Text(t) | Event::Code(t) => {
                    if in_heading {
                        heading_buf.push_str(&t);
                    } else if let Some(buf) = block_buf.as_mut() {
                        buf.push_str(&t);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some(buf) = block_buf.as_mut() {
                        buf.push(' ');
                    }
                }
                _ => {}
            }
        }

        chunks
    }

    fn kind_for_section(heading: &str) -> ChunkKind {
        let normalized = heading.to_lowercase();
        if normalized.contains("definition") {
            ChunkKind::Definition
        } else if normalized.contains("formula") {
            ChunkKind::Formula
        } else if normalized.contains("algorithm") {
            ChunkKind::Algorithm
        } else if normalized.contains("example") {
            ChunkKind::Example
        } else {
            ChunkKind::StructuredConcept
        }
    }
}
