//! Configuration structures.
//!
//! Every subsystem owns a small `serde`-deserializable config struct with a
//! sensible `Default`; `Config` just aggregates them the way a real deployment
//! would load one YAML/JSON document and hand each subsystem its slice.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration aggregating every subsystem's config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub event_bus: EventBusConfig,

    #[serde(default)]
    pub features: crate::features::FeatureConfig,

    #[serde(default)]
    pub providers: ProviderRegistryConfig,

    #[serde(default)]
    pub formatter_cache: FormatterCacheConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Event bus (C1) tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Per-subscriber bounded queue capacity.
    pub buffer_size: usize,

    /// Maximum time a publish will wait on a single subscriber's queue.
    #[serde(with = "humantime_serde")]
    pub publish_timeout: Duration,

    /// How often the sweeper removes closed subscribers.
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            publish_timeout: Duration::from_millis(100),
            cleanup_interval: Duration::from_secs(30),
        }
    }
}

/// Provider registry (C3) tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRegistryConfig {
    /// Ordered fallback chain, tried sequentially on error.
    pub fallback_chain: Vec<String>,

    /// Provider used when none is named explicitly.
    pub default_provider: Option<String>,
}

impl Default for ProviderRegistryConfig {
    fn default() -> Self {
        Self {
            fallback_chain: vec![
                "openai-3-small".to_string(),
                "bge-m3".to_string(),
                "all-mpnet-base-v2".to_string(),
                "local-fallback".to_string(),
            ],
            default_provider: None,
        }
    }
}

/// Formatter cache (C4) tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterCacheConfig {
    /// Maximum number of entries retained; oldest is evicted before insert.
    pub max_size: usize,

    /// Entry time-to-live.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Background sweep frequency.
    #[serde(with = "humantime_serde")]
    pub cleanup_freq: Duration,
}

impl Default for FormatterCacheConfig {
    fn default() -> Self {
        Self {
            max_size: 10_000,
            ttl: Duration::from_secs(3600),
            cleanup_freq: Duration::from_secs(60),
        }
    }
}

/// Formatter orchestrator (C5) tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Default per-request formatter timeout when the request specifies none.
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,

    /// Global timeout applied to a full `health::check_all` pass.
    #[serde(with = "humantime_serde")]
    pub health_check_timeout: Duration,

    /// Bounded parallelism for health checks (spec fixes this at 10).
    pub health_check_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            health_check_timeout: Duration::from_secs(10),
            health_check_concurrency: 10,
        }
    }
}
