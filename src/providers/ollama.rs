//! Ollama-compatible embeddings HTTP client.
//!
//! The upstream API is single-item: `encode` loops, posting once per text
//! and failing fast on the first error. Do not parallelize this without
//! reverifying the upstream contract (see Design Notes).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Error, Result};

use super::provider::{EmbeddingProvider, Embeddings};

#[derive(Debug)]
pub struct OllamaProvider {
    name: String,
    model: String,
    dimensions: usize,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { name: name.into(), model: model.into(), dimensions, base_url: base_url.into(), client })
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> Result<Embeddings> {
        let url = format!("{}/api/embeddings", self.base_url.trim_end_matches('/'));
        let mut rows = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            let response = self
                .client
                .post(&url)
                .json(&OllamaRequest { model: &self.model, prompt: text })
                .send()
                .await
                .map_err(|e| Error::transient(format!("failed to encode text {i}: {e}")))?
                .error_for_status()
                .map_err(|e| Error::transient(format!("failed to encode text {i}: {e}")))?;
            let parsed: OllamaResponse = response
                .json()
                .await
                .map_err(|e| Error::transient(format!("failed to encode text {i}: {e}")))?;
            rows.push(parsed.embedding);
        }
        Ok(rows)
    }

    async fn health(&self) -> Result<()> {
        self.encode(&["ping".to_string()])
            .await
            .map(|_| ())
            .map_err(|e| Error::transient(format!("ollama health check failed: {e}")))
    }
}
