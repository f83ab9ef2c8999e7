//! `AgentCapability` profiles and the `CapabilityRegistry` that indexes them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::feature::ADVANCED_FEATURES;

/// Transport protocol an agent is capable of speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http2,
    Http3,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Http2 => "h2",
            Transport::Http3 => "h3",
        }
    }
}

/// Per-agent capability profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCapability {
    /// Lowercase agent name, matching the detection table verbatim.
    pub name: String,
    pub supported: HashSet<String>,
    /// Force-on regardless of registry defaults, as long as also supported.
    pub preferred: HashSet<String>,
    pub unsupported: HashSet<String>,
    pub transport: Transport,
    pub compression: Vec<String>,
    pub streaming_methods: Vec<String>,
    pub recommended_concurrency: u32,
}

fn cap(
    name: &str,
    supported: &[&str],
    preferred: &[&str],
    transport: Transport,
    compression: &[&str],
    streaming: &[&str],
    concurrency: u32,
) -> AgentCapability {
    AgentCapability {
        name: name.to_string(),
        supported: supported.iter().map(|s| s.to_string()).collect(),
        preferred: preferred.iter().map(|s| s.to_string()).collect(),
        unsupported: HashSet::new(),
        transport,
        compression: compression.iter().map(|s| s.to_string()).collect(),
        streaming_methods: streaming.iter().map(|s| s.to_string()).collect(),
        recommended_concurrency: concurrency,
    }
}

/// The feature defaults applied when an agent's user-agent string matches
/// nothing in the detection table.
pub const BASIC_FEATURE_SET: &[&str] = &["http2", "sse", "jsonl", "gzip", "embeddings", "caching"];

fn basic(name: &str) -> AgentCapability {
    cap(name, BASIC_FEATURE_SET, &[], Transport::Http2, &["gzip"], &["sse", "jsonl"], 8)
}

/// Builds the full agent table. Entries' `name` keys must match the
/// detection table in `agent_detect.rs` verbatim.
pub fn default_capabilities() -> Vec<AgentCapability> {
    vec![
        cap(
            "helixcode",
            &["graphql", "toon", "http2", "http3", "websocket", "sse", "jsonl", "brotli", "gzip",
              "zstd", "debate", "embeddings", "tool_calling", "caching", "metrics"],
            &["graphql", "toon", "http3"],
            Transport::Http3,
            &["brotli", "zstd", "gzip"],
            &["websocket", "sse", "jsonl"],
            64,
        ),
        cap(
            "opencode",
            &["http2", "http3", "sse", "websocket", "gzip", "zstd", "embeddings", "tool_calling", "caching", "mcp"],
            &["http3"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse", "websocket"],
            32,
        ),
        basic("crush"),
        cap(
            "kiro",
            &["http2", "http3", "sse", "gzip", "zstd", "embeddings", "tool_calling", "caching", "lsp"],
            &["http3"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse"],
            24,
        ),
        cap(
            "aider",
            &["http2", "sse", "jsonl", "gzip", "embeddings", "tool_calling", "caching", "lsp"],
            &[],
            Transport::Http2,
            &["gzip"],
            &["sse", "jsonl"],
            16,
        ),
        cap(
            "claudecode",
            &["graphql", "toon", "http2", "http3", "websocket", "sse", "jsonl", "brotli", "gzip",
              "zstd", "mcp", "acp", "lsp", "grpc", "embeddings", "vision", "cognee", "debate",
              "batch", "tool_calling", "multipass", "caching", "rate_limiting", "metrics", "tracing"],
            &["graphql", "toon", "http3", "websocket", "mcp"],
            Transport::Http3,
            &["brotli", "zstd", "gzip"],
            &["websocket", "sse", "jsonl"],
            100,
        ),
        cap(
            "cline",
            &["http2", "sse", "jsonl", "gzip", "embeddings", "tool_calling", "caching", "lsp", "mcp"],
            &["mcp"],
            Transport::Http2,
            &["gzip"],
            &["sse", "jsonl"],
            16,
        ),
        cap(
            "codenamegoose",
            &["http2", "http3", "sse", "gzip", "zstd", "embeddings", "tool_calling", "caching", "mcp"],
            &["http3", "mcp"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse"],
            24,
        ),
        basic("deepseekcli"),
        cap(
            "forge",
            &["http2", "http3", "sse", "websocket", "gzip", "zstd", "embeddings", "tool_calling", "caching"],
            &["http3"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["websocket", "sse"],
            32,
        ),
        cap(
            "geminicli",
            &["http2", "http3", "sse", "gzip", "zstd", "brotli", "embeddings", "tool_calling", "caching", "vision"],
            &["http3", "brotli"],
            Transport::Http3,
            &["brotli", "zstd", "gzip"],
            &["sse"],
            40,
        ),
        cap(
            "gptengineer",
            &["http2", "sse", "jsonl", "gzip", "embeddings", "caching", "tool_calling"],
            &[],
            Transport::Http2,
            &["gzip"],
            &["sse", "jsonl"],
            12,
        ),
        cap(
            "kilocode",
            &["http2", "http3", "sse", "gzip", "zstd", "embeddings", "tool_calling", "caching", "lsp", "mcp"],
            &["http3"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse"],
            24,
        ),
        basic("mistralcode"),
        basic("ollamacode"),
        cap(
            "plandex",
            &["http2", "http3", "sse", "gzip", "zstd", "embeddings", "tool_calling", "caching", "batch"],
            &["http3", "batch"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse"],
            24,
        ),
        cap(
            "qwencode",
            &["http2", "http3", "sse", "gzip", "zstd", "embeddings", "tool_calling", "caching"],
            &["http3"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse"],
            24,
        ),
        cap(
            "amazonq",
            &["http2", "http3", "sse", "gzip", "zstd", "embeddings", "tool_calling", "caching", "vision"],
            &["http3"],
            Transport::Http3,
            &["zstd", "gzip"],
            &["sse"],
            32,
        ),
    ]
}

/// Index over `AgentCapability` entries, keyed by lowercased agent name.
#[derive(Debug)]
pub struct CapabilityRegistry {
    agents: HashMap<String, AgentCapability>,
}

impl CapabilityRegistry {
    pub fn new(agents: Vec<AgentCapability>) -> Self {
        Self {
            agents: agents.into_iter().map(|a| (a.name.clone(), a)).collect(),
        }
    }

    /// Case-insensitive lookup.
    pub fn get_capability(&self, name: &str) -> Option<&AgentCapability> {
        self.agents.get(&name.to_lowercase())
    }

    pub fn get_agents_by_feature(&self, feature: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .agents
            .values()
            .filter(|a| a.supported.contains(feature))
            .map(|a| a.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Merged per-agent default map: start all-off, enable supported features
    /// to their registry default, then force-enable preferred. Falls back to
    /// the basic-feature set for an unrecognized agent name.
    pub fn get_agent_feature_defaults(
        &self,
        name: &str,
        feature_registry: &super::registry::FeatureRegistry,
    ) -> HashMap<String, bool> {
        match self.get_capability(name) {
            Some(capability) => apply_agent_layer(capability, feature_registry),
            None => {
                let mut defaults = HashMap::new();
                for id in BASIC_FEATURE_SET {
                    defaults.insert(id.to_string(), true);
                }
                defaults
            }
        }
    }

    /// Agents supporting the entire "advanced" set.
    pub fn full_feature_agents(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .agents
            .values()
            .filter(|a| ADVANCED_FEATURES.iter().all(|f| a.supported.contains(*f)))
            .map(|a| a.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new(default_capabilities())
    }
}

/// Compute the feature map contributed by one agent's capability profile:
/// all-off, then supported features enabled to their registry default, then
/// preferred features forced on.
pub(crate) fn apply_agent_layer(
    capability: &AgentCapability,
    feature_registry: &super::registry::FeatureRegistry,
) -> HashMap<String, bool> {
    let mut layer = HashMap::new();
    for feature in feature_registry.all() {
        layer.insert(feature.id.clone(), false);
    }
    for id in &capability.supported {
        layer.insert(id.clone(), feature_registry.default_enabled(id));
    }
    for id in &capability.preferred {
        layer.insert(id.clone(), true);
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::registry::FeatureRegistry;

    #[test]
    fn case_insensitive_lookup() {
        let registry = CapabilityRegistry::default();
        assert!(registry.get_capability("HelixCode").is_some());
        assert!(registry.get_capability("HELIXCODE").is_some());
    }

    #[test]
    fn full_feature_agents_include_helixcode_and_claudecode() {
        let registry = CapabilityRegistry::default();
        let full = registry.full_feature_agents();
        assert!(full.contains(&"helixcode"));
        assert!(full.contains(&"claudecode"));
        assert!(!full.contains(&"crush"));
    }

    #[test]
    fn unknown_agent_falls_back_to_basic_feature_set() {
        let registry = CapabilityRegistry::default();
        let feature_registry = FeatureRegistry::default();
        let defaults = registry.get_agent_feature_defaults("nonexistent-agent", &feature_registry);
        for id in BASIC_FEATURE_SET {
            assert_eq!(defaults.get(*id), Some(&true));
        }
    }

    #[test]
    fn helixcode_layer_force_enables_preferred() {
        let registry = CapabilityRegistry::default();
        let feature_registry = FeatureRegistry::default();
        let capability = registry.get_capability("helixcode").unwrap();
        let layer = apply_agent_layer(capability, &feature_registry);
        assert_eq!(layer.get("graphql"), Some(&true));
        assert_eq!(layer.get("toon"), Some(&true));
        assert_eq!(layer.get("http3"), Some(&true));
    }
}
