//! Sentence-Transformers-compatible embeddings HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Error, Result};

use super::provider::{EmbeddingProvider, Embeddings};

#[derive(Debug)]
pub struct SentenceTransformersProvider {
    name: String,
    model: String,
    dimensions: usize,
    base_url: String,
    client: reqwest::Client,
}

impl SentenceTransformersProvider {
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
struct SentenceTransformersRequest<'a> {
    texts: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct SentenceTransformersResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for SentenceTransformersProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> Result<Embeddings> {
        let url = format!("{}/encode", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&SentenceTransformersRequest { texts, model: &self.model })
            .send()
            .await?
            .error_for_status()?;
        let parsed: SentenceTransformersResponse = response.json().await?;
        Ok(parsed.embeddings)
    }

    async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        let response = self.client.get(&url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::transient(format!("sentence-transformers health check returned {}", response.status())))
        }
    }
}
