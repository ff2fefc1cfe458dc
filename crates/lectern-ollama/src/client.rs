//! Ollama HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use lectern_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationProvider, Result,
};

use crate::config::OllamaConfig;

/// Client for a local Ollama server, covering both the embedding and the
/// generation endpoints.
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new Ollama client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env()?)
    }

    async fn perform_embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.config.base_url);
        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::EmbeddingProvider(format!(
                "embedding request failed with status {status}: {body}"
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(Error::EmbeddingProvider(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }
        if let Some(bad) = parsed
            .embeddings
            .iter()
            .find(|v| v.len() != self.config.embedding_dimension)
        {
            return Err(Error::EmbeddingProvider(format!(
                "model '{}' returned a {}-dimensional vector, expected {}; \
                 check LECTERN_EMBEDDING_DIMENSION",
                self.config.embedding_model,
                bad.len(),
                self.config.embedding_dimension
            )));
        }

        Ok(parsed.embeddings)
    }

    async fn perform_generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let request = GenerateRequest {
            model: &self.config.generation_model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: config.max_tokens,
                temperature: config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::GenerationProvider(format!(
                "generation request failed with status {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let answer = parsed.response.trim().to_string();
        if answer.is_empty() {
            return Err(Error::GenerationProvider(format!(
                "empty response from model '{}'",
                self.config.generation_model
            )));
        }

        Ok(answer)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let window = Duration::from_secs(self.config.timeout_secs);
        match timeout(window, self.perform_embed(texts)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "embedding request exceeded {}s",
                self.config.timeout_secs
            ))),
        }
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}

#[async_trait]
impl GenerationProvider for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_config(prompt, &GenerationConfig::default())
            .await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String> {
        match timeout(config.timeout, self.perform_generate(prompt, config)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "generation request exceeded {:?}",
                config.timeout
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.generation_model
    }
}
