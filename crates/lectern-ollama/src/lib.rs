//! Ollama integration for Lectern
//!
//! Implements the embedding and generation provider traits against a local
//! Ollama server's HTTP API.

mod client;
mod config;

pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types
pub use lectern_core::{Error, Result};
