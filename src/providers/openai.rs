//! OpenAI-compatible embeddings HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Error, Result};

use super::provider::{EmbeddingProvider, Embeddings};

#[derive(Debug)]
pub struct OpenAiProvider {
    name: String,
    model: String,
    dimensions: usize,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name: name.into(),
            model: model.into(),
            dimensions,
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbeddingRow>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingRow {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> Result<Embeddings> {
        let url = format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&OpenAiRequest { input: texts, model: &self.model })
            .send()
            .await?
            .error_for_status()?;
        let parsed: OpenAiResponse = response.json().await?;
        let mut rows: Vec<OpenAiEmbeddingRow> = parsed.data;
        rows.sort_by_key(|row| row.index);
        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }

    async fn health(&self) -> Result<()> {
        self.encode(&["ping".to_string()])
            .await
            .map(|_| ())
            .map_err(|e| Error::transient(format!("openai health check failed: {e}")))
    }
}
