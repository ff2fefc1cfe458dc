//! Chunking, vector store, and retrieval engine for Lectern
//!
//! The pipeline: raw lecture text goes through the [`chunker`] into chunk
//! records, the [`store`] embeds and persists them as a snapshot, the
//! [`retriever`] ranks them against a query, and the [`composer`] turns the
//! ranked chunks plus [`session`] context into a generated answer.

pub mod chunker;
pub mod composer;
pub mod corpus;
pub mod hashing;
pub mod retriever;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use chunker::{Chunker, ChunkerConfig};
pub use composer::{AnswerComposer, ComposedAnswer};
pub use corpus::{CorpusLoad, LectureCorpus};
pub use hashing::HashingEmbedder;
pub use retriever::Retriever;
pub use session::{SessionStats, StudySession};
pub use store::{IndexStats, Snapshot, VectorStore};

// Re-export core types
pub use lectern_core::{Chunk, ChunkKind, ChunkSource, Error, Result};
