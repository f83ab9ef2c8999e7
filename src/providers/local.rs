//! Deterministic local fallback provider. No network dependency; always
//! healthy. Used as the guaranteed last link of the fallback chain.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::types::Result;

use super::provider::{EmbeddingProvider, Embeddings};

#[derive(Debug, Clone)]
pub struct LocalProvider {
    name: String,
    dimensions: usize,
}

impl LocalProvider {
    pub fn new(name: impl Into<String>, dimensions: usize) -> Self {
        Self { name: name.into(), dimensions }
    }

    /// Deterministic SHA-256-derived pseudo-embedding, L2-normalized to unit
    /// length. See `spec.md` §4.3 "Local hash embedding algorithm".
    pub fn hash_embedding(text: &str, dimensions: usize) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut embedding = Vec::with_capacity(dimensions);
        for i in 0..dimensions {
            let seed = digest[i % 32] as u32 + i as u32;
            let bytes = seed.to_le_bytes();
            let v = u32::from_le_bytes(bytes);
            let unit = (v as f64) / (u32::MAX as f64 + 1.0);
            embedding.push((unit * 2.0 - 1.0) as f32);
        }
        l2_normalize(&mut embedding);
        embedding
    }
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for component in vector.iter_mut() {
            *component /= norm;
        }
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> Result<Embeddings> {
        Ok(texts.iter().map(|t| Self::hash_embedding(t, self.dimensions)).collect())
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}
