//! `ProviderConfig` — declarative description of one embedding backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What kind of backend a `ProviderConfig` describes. Dispatched once, at
/// construction time, into a concrete `EmbeddingProvider` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    OpenaiLike,
    OllamaLike,
    SentenceTransformers,
    Local,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenaiLike => "openai-like",
            ProviderKind::OllamaLike => "ollama-like",
            ProviderKind::SentenceTransformers => "sentence-transformers",
            ProviderKind::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    pub dimensions: usize,
    pub max_input_tokens: usize,
    pub batch_size: usize,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            model: model.into(),
            dimensions,
            max_input_tokens: 8192,
            batch_size: 32,
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            base_url: None,
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
