//! Ollama configuration

use serde::{Deserialize, Serialize};
use std::env;

use lectern_core::{Error, Result};

/// Configuration for the Ollama client
///
/// The embedding dimension must match the configured embedding model; the
/// default pairs the 384-dimensional `all-minilm` with `llama3.1:8b` for
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub timeout_secs: u64,
}

impl OllamaConfig {
    /// Create configuration from environment variables, with defaults for a
    /// stock local Ollama install.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());

        let generation_model =
            env::var("LECTERN_GENERATION_MODEL").unwrap_or_else(|_| "llama3.1:8b".to_string());

        let embedding_model =
            env::var("LECTERN_EMBEDDING_MODEL").unwrap_or_else(|_| "all-minilm".to_string());

        let embedding_dimension = match env::var("LECTERN_EMBEDDING_DIMENSION") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Configuration(format!(
                    "LECTERN_EMBEDDING_DIMENSION must be a positive integer, got '{raw}'"
                ))
            })?,
            Err(_) => 384,
        };

        let timeout_secs = match env::var("LECTERN_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Configuration(format!(
                    "LECTERN_REQUEST_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                ))
            })?,
            Err(_) => 120,
        };

        Ok(Self {
            base_url,
            generation_model,
            embedding_model,
            embedding_dimension,
            timeout_secs,
        })
    }

    /// Create configuration with explicit values and default models.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            generation_model: "llama3.1:8b".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dimension: 384,
            timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_defaults() {
        let config = OllamaConfig::new("http://localhost:11434");
        assert_eq!(config.embedding_dimension, 384);
        assert_eq!(config.generation_model, "llama3.1:8b");
    }
}
