//! Core traits and types for Lectern
//!
//! This crate defines the fundamental traits and types used across the
//! Lectern study assistant. It provides capability-facing interfaces for
//! embedding and generation providers plus the shared chunk and retrieval
//! record types, keeping the concrete engines test-friendly and swappable.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod retrieval;
pub mod session;

pub use chunk::{Chunk, ChunkKind, ChunkSource};
pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use generation::{GenerationConfig, GenerationProvider};
pub use retrieval::{RelevanceMode, RetrievalConfig, ScoredChunk};
pub use session::{ConversationTurn, TurnKind};
