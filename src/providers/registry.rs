//! `ProviderRegistry` — lazy construction + sequential fallback execution.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{Error, ProviderRegistryConfig, Result};

use super::config::{ProviderConfig, ProviderKind};
use super::local::LocalProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::provider::{EmbeddingProvider, Embeddings};
use super::sentence_transformers::SentenceTransformersProvider;

/// Environment variable names that toggle default provider registration.
/// Out of scope per `spec.md` §1 is the concrete HTTP client wiring beyond
/// these names; any base URL value is taken as-is.
pub const API_KEY_ENV_NAMED_OPENAI: &str = "AGENTGATE_OPENAI_API_KEY";
pub const URL_ENV_OLLAMA: &str = "AGENTGATE_OLLAMA_URL";
pub const URL_ENV_SENTENCE_TRANSFORMERS: &str = "AGENTGATE_SENTENCE_TRANSFORMERS_URL";

#[derive(Debug)]
pub struct ProviderRegistry {
    configs: HashMap<String, ProviderConfig>,
    instances: RwLock<HashMap<String, Arc<dyn EmbeddingProvider>>>,
    fallback_chain: Vec<String>,
    default_name: String,
}

fn env_seeded_configs() -> Vec<ProviderConfig> {
    use std::time::Duration;

    let mut configs = Vec::new();

    if let Ok(api_key) = std::env::var(API_KEY_ENV_NAMED_OPENAI) {
        for (name, model, dims) in [
            ("openai-3-small", "text-embedding-3-small", 1536),
            ("openai-3-large", "text-embedding-3-large", 1536),
            ("openai-ada-002", "text-embedding-ada-002", 3072),
        ] {
            configs.push(
                ProviderConfig::new(name, ProviderKind::OpenaiLike, model, dims)
                    .with_base_url("https://api.openai.com")
                    .with_api_key(api_key.clone())
                    .with_timeout(Duration::from_secs(30)),
            );
        }
    }

    if let Ok(base_url) = std::env::var(URL_ENV_OLLAMA) {
        for (name, model, dims) in [
            ("bge-m3", "bge-m3", 768),
            ("nomic-embed-text", "nomic-embed-text", 1024),
            ("mxbai-embed-large", "mxbai-embed-large", 1024),
        ] {
            configs.push(
                ProviderConfig::new(name, ProviderKind::OllamaLike, model, dims)
                    .with_base_url(base_url.clone())
                    .with_timeout(Duration::from_secs(60)),
            );
        }
    }

    if let Ok(base_url) = std::env::var(URL_ENV_SENTENCE_TRANSFORMERS) {
        for (name, model, dims) in
            [("all-mpnet-base-v2", "all-mpnet-base-v2", 768), ("all-minilm-l6-v2", "all-MiniLM-L6-v2", 384)]
        {
            configs.push(
                ProviderConfig::new(name, ProviderKind::SentenceTransformers, model, dims)
                    .with_base_url(base_url.clone())
                    .with_timeout(Duration::from_secs(30)),
            );
        }
    }

    configs.push(ProviderConfig::new("local-fallback", ProviderKind::Local, "local-hash-v1", 1536));

    configs
}

impl ProviderRegistry {
    /// Builds the registry: env-seeded defaults, overridden by any explicit
    /// configs passed in, plus `config`'s fallback chain and default provider
    /// name (itself defaulted to the spec's chain — see
    /// `ProviderRegistryConfig::default`).
    pub fn new(explicit_configs: Vec<ProviderConfig>, config: ProviderRegistryConfig) -> Self {
        let mut configs: HashMap<String, ProviderConfig> =
            env_seeded_configs().into_iter().map(|c| (c.name.clone(), c)).collect();
        for config in explicit_configs {
            configs.insert(config.name.clone(), config);
        }

        let fallback_chain = config.fallback_chain;
        let default_name = config
            .default_provider
            .or_else(|| fallback_chain.first().cloned())
            .unwrap_or_else(|| "local-fallback".to_string());

        Self { configs, instances: RwLock::new(HashMap::new()), fallback_chain, default_name }
    }

    pub fn fallback_chain(&self) -> &[String] {
        &self.fallback_chain
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    fn construct(config: &ProviderConfig) -> Result<Arc<dyn EmbeddingProvider>> {
        let provider: Arc<dyn EmbeddingProvider> = match config.kind {
            ProviderKind::OpenaiLike => Arc::new(OpenAiProvider::new(
                &config.name,
                &config.model,
                config.dimensions,
                config.base_url.as_deref().unwrap_or("https://api.openai.com"),
                config.api_key.as_deref().unwrap_or_default(),
                config.timeout,
            )?),
            ProviderKind::OllamaLike => Arc::new(OllamaProvider::new(
                &config.name,
                &config.model,
                config.dimensions,
                config.base_url.as_deref().unwrap_or("http://localhost:11434"),
                config.timeout,
            )?),
            ProviderKind::SentenceTransformers => Arc::new(SentenceTransformersProvider::new(
                &config.name,
                &config.model,
                config.dimensions,
                config.base_url.as_deref().unwrap_or("http://localhost:8080"),
                config.timeout,
            )?),
            ProviderKind::Local => Arc::new(LocalProvider::new(&config.name, config.dimensions)),
        };
        Ok(provider)
    }

    /// Double-checked get-or-create: shared-lock fast path, exclusive-lock
    /// re-check on miss, single construction per name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn EmbeddingProvider>> {
        if let Some(existing) = self.instances.read().get(name) {
            return Ok(existing.clone());
        }

        let mut instances = self.instances.write();
        if let Some(existing) = instances.get(name) {
            return Ok(existing.clone());
        }

        let config = self
            .configs
            .get(name)
            .ok_or_else(|| Error::not_found(format!("no provider config registered for '{name}'")))?;
        let provider = Self::construct(config).map_err(|e| {
            Error::not_supported(format!("unknown embedding provider: {} ({e})", config.kind.as_str()))
        })?;
        instances.insert(name.to_string(), provider.clone());
        Ok(provider)
    }

    /// Try each name in the fallback chain in order; returns the first
    /// success along with the name that produced it.
    pub async fn encode_with_fallback(&self, texts: &[String]) -> Result<(Embeddings, String)> {
        for name in &self.fallback_chain {
            let provider = match self.get(name) {
                Ok(p) => p,
                Err(e) => {
                    debug!(provider = %name, error = %e, "provider unavailable, trying next in chain");
                    continue;
                }
            };
            match provider.encode(texts).await {
                Ok(embeddings) => return Ok((embeddings, name.clone())),
                Err(e) => {
                    debug!(provider = %name, error = %e, "provider encode failed, trying next in chain");
                    continue;
                }
            }
        }
        Err(Error::transient("all embedding models in fallback chain failed"))
    }

    pub async fn encode_single_with_fallback(&self, text: &str) -> Result<(Vec<f32>, String)> {
        let (mut rows, name) = self.encode_with_fallback(std::slice::from_ref(&text.to_string())).await?;
        Ok((rows.pop().unwrap_or_default(), name))
    }

    /// Health-checks every already-instantiated provider (not the full
    /// config set) under the shared lock.
    pub async fn health_all(&self) -> HashMap<String, Result<()>> {
        let snapshot: Vec<(String, Arc<dyn EmbeddingProvider>)> =
            self.instances.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let mut results = HashMap::with_capacity(snapshot.len());
        for (name, provider) in snapshot {
            results.insert(name, provider.health().await);
        }
        results
    }

    /// Closes every instantiated provider, aggregating the last error, then
    /// clears the instance map.
    pub async fn close(&self) -> Result<()> {
        let snapshot: Vec<Arc<dyn EmbeddingProvider>> = self.instances.read().values().cloned().collect();
        let mut last_err = None;
        for provider in snapshot {
            if let Err(e) = provider.close().await {
                last_err = Some(e);
            }
        }
        self.instances.write().clear();
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
impl ProviderRegistry {
    /// Pre-populates the instance map directly, bypassing config-driven
    /// construction. Lets fallback tests exercise the real
    /// `encode_with_fallback` dispatch loop against `mockall` mocks instead
    /// of a live HTTP backend.
    pub(crate) fn insert_test_instance(&self, name: &str, instance: Arc<dyn EmbeddingProvider>) {
        self.instances.write().insert(name.to_string(), instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing_test::{logs_contain, traced_test};

    fn chain_config(names: &[&str]) -> ProviderRegistryConfig {
        ProviderRegistryConfig {
            fallback_chain: names.iter().map(|s| s.to_string()).collect(),
            default_provider: None,
        }
    }

    #[test]
    fn unknown_name_is_not_found() {
        let registry = ProviderRegistry::new(vec![], chain_config(&["local-fallback"]));
        assert!(registry.get("does-not-exist").is_err());
    }

    #[test]
    fn default_chain_and_name_match_spec() {
        let registry = ProviderRegistry::new(vec![], ProviderRegistryConfig::default());
        assert_eq!(
            registry.fallback_chain(),
            &["openai-3-small", "bge-m3", "all-mpnet-base-v2", "local-fallback"]
        );
        assert_eq!(registry.default_name(), "openai-3-small");
    }

    #[tokio::test]
    async fn fallback_exhaustion_names_all_models() {
        let registry = ProviderRegistry::new(vec![], chain_config(&[]));
        let err = registry.encode_with_fallback(&["hi".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("all embedding models in fallback chain failed"));
    }

    #[tokio::test]
    async fn cold_start_local_only_chain_produces_unit_vector() {
        let registry = ProviderRegistry::new(vec![], chain_config(&["local-fallback"]));
        let (vector, used) = registry.encode_single_with_fallback("hello").await.unwrap();
        assert_eq!(used, "local-fallback");
        assert_eq!(vector.len(), 1536);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn get_or_create_constructs_exactly_once_under_concurrency() {
        let registry = Arc::new(ProviderRegistry::new(vec![], chain_config(&["local-fallback"])));

        let mut handles = Vec::new();
        for _ in 0..100 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.get("local-fallback").unwrap() }));
        }

        let mut first: Option<Arc<dyn EmbeddingProvider>> = None;
        for handle in handles {
            let provider = handle.await.unwrap();
            if let Some(existing) = &first {
                assert!(Arc::ptr_eq(existing, &provider));
            } else {
                first = Some(provider);
            }
        }
    }

    mockall::mock! {
        #[derive(Debug)]
        pub Provider {}

        #[async_trait::async_trait]
        impl EmbeddingProvider for Provider {
            fn name(&self) -> &str;
            fn dimensions(&self) -> usize;
            async fn encode(&self, texts: &[String]) -> Result<Embeddings>;
            async fn health(&self) -> Result<()>;
        }
    }

    /// Exercises the real `encode_with_fallback` loop (spec property 3:
    /// "Fallback progression") against mocked providers instead of the real
    /// HTTP-backed kinds, so a chain of failures needs no live server.
    #[traced_test]
    #[tokio::test]
    async fn fallback_progresses_past_failing_mocks_to_first_success() {
        let registry = ProviderRegistry::new(vec![], chain_config(&["mock-a", "mock-b", "mock-c"]));

        let mut a = MockProvider::new();
        a.expect_name().return_const("mock-a".to_string());
        a.expect_dimensions().return_const(4usize);
        a.expect_encode().returning(|_| Err(Error::transient("mock-a unreachable")));

        let mut b = MockProvider::new();
        b.expect_name().return_const("mock-b".to_string());
        b.expect_dimensions().return_const(4usize);
        b.expect_encode().returning(|_| Err(Error::transient("mock-b unreachable")));

        let mut c = MockProvider::new();
        c.expect_name().return_const("mock-c".to_string());
        c.expect_dimensions().return_const(4usize);
        c.expect_encode().returning(|_| Ok(vec![vec![1.0, 0.0, 0.0, 0.0]]));

        registry.insert_test_instance("mock-a", Arc::new(a));
        registry.insert_test_instance("mock-b", Arc::new(b));
        registry.insert_test_instance("mock-c", Arc::new(c));

        let (embeddings, used) = registry.encode_with_fallback(&["hi".to_string()]).await.unwrap();
        assert_eq!(used, "mock-c");
        assert!(logs_contain("provider encode failed, trying next in chain"));
        assert_eq!(embeddings, vec![vec![1.0, 0.0, 0.0, 0.0]]);
    }
}
