//! `EmbeddingProvider` — the capability set every provider kind implements.

use async_trait::async_trait;

use crate::types::Result;

/// One embedded vector batch. Row order matches the input text order.
pub type Embeddings = Vec<Vec<f32>>;

/// Polymorphic over {encode one, encode many, health, close, identity}.
/// Object-safe so the registry can hold `Arc<dyn EmbeddingProvider>`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Stable provider name, matching its `ProviderConfig.name`.
    fn name(&self) -> &str;

    /// Declared output vector width.
    fn dimensions(&self) -> usize;

    async fn encode(&self, texts: &[String]) -> Result<Embeddings>;

    async fn encode_single(&self, text: &str) -> Result<Vec<f32>> {
        let mut rows = self.encode(std::slice::from_ref(&text.to_string())).await?;
        Ok(rows.pop().unwrap_or_default())
    }

    async fn health(&self) -> Result<()>;

    /// Release any held resources (HTTP client pools, etc). Best-effort.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
