//! Provider Registry with Fallback Execution (C3).
//!
//! Lazy instantiation of embedding provider clients from declarative
//! configs, double-checked-locking `get`, and sequential fallback across a
//! configured chain.

mod config;
mod local;
mod ollama;
mod openai;
mod provider;
mod registry;
mod sentence_transformers;

pub use config::{ProviderConfig, ProviderKind};
pub use local::LocalProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{EmbeddingProvider, Embeddings};
pub use registry::{ProviderRegistry, API_KEY_ENV_NAMED_OPENAI, URL_ENV_OLLAMA, URL_ENV_SENTENCE_TRANSFORMERS};
pub use sentence_transformers::SentenceTransformersProvider;
