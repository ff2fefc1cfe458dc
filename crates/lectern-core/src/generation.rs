//! Generation provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Trait for generation providers (e.g., Ollama)
///
/// The generation model is a black box from the engine's point of view: a
/// prompt goes in, free text comes out. Failures surface as
/// [`Error::GenerationProvider`](crate::Error::GenerationProvider) and are
/// caught at the answer-composer boundary, never propagated as a crash of an
/// interactive session.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate text with the default configuration.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with custom configuration.
    async fn generate_with_config(&self, prompt: &str, config: &GenerationConfig)
    -> Result<String>;

    /// Get the model ID being used.
    fn model_id(&self) -> &str;
}
