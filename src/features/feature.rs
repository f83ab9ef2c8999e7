//! Static feature metadata.

use serde::{Deserialize, Serialize};

/// A feature's category, used only for grouping in discovery UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Protocol,
    Transport,
    Compression,
    Streaming,
    Tooling,
    Orchestration,
    Observability,
}

/// Declarative metadata for one feature. Process-lifetime, constructed once
/// by `FeatureRegistry::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Canonical lowercase dotted identifier, e.g. `tool_calling`.
    pub id: String,
    pub display_name: String,
    pub category: FeatureCategory,
    pub default_enabled: bool,
    /// Every entry here must also be enabled for this feature to validate.
    pub requires: Vec<String>,
    /// Every entry here must be disabled for this feature to validate.
    pub conflicts_with: Vec<String>,
    /// Canonical `X-Feature-<Name>` header name.
    pub header_name: String,
    /// Canonical query parameter name (always the feature id itself).
    pub query_param: String,
}

impl Feature {
    fn new(id: &str, display_name: &str, category: FeatureCategory, header_suffix: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            category,
            default_enabled: false,
            requires: Vec::new(),
            conflicts_with: Vec::new(),
            header_name: format!("X-Feature-{header_suffix}"),
            query_param: id.to_string(),
        }
    }

    fn default_on(mut self) -> Self {
        self.default_enabled = true;
        self
    }

    fn requires(mut self, ids: &[&str]) -> Self {
        self.requires = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    fn conflicts_with(mut self, ids: &[&str]) -> Self {
        self.conflicts_with = ids.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The canonical feature identifiers from the crate's external contract.
pub fn default_features() -> Vec<Feature> {
    use FeatureCategory::*;
    vec![
        Feature::new("graphql", "GraphQL", Protocol, "GraphQL"),
        Feature::new("toon", "TOON", Protocol, "TOON"),
        Feature::new("http2", "HTTP/2", Transport, "HTTP2").conflicts_with(&["http3"]).default_on(),
        Feature::new("http3", "HTTP/3", Transport, "HTTP3").conflicts_with(&["http2"]),
        Feature::new("websocket", "WebSocket", Streaming, "WebSocket"),
        Feature::new("sse", "Server-Sent Events", Streaming, "SSE").default_on(),
        Feature::new("jsonl", "JSON Lines", Streaming, "JSONL").default_on(),
        Feature::new("brotli", "Brotli", Compression, "Brotli"),
        Feature::new("gzip", "gzip", Compression, "Gzip").default_on(),
        Feature::new("zstd", "Zstandard", Compression, "Zstd"),
        Feature::new("mcp", "Model Context Protocol", Protocol, "MCP"),
        Feature::new("acp", "Agent Client Protocol", Protocol, "ACP"),
        Feature::new("lsp", "Language Server Protocol", Protocol, "LSP"),
        Feature::new("grpc", "gRPC", Protocol, "GRPC"),
        Feature::new("embeddings", "Embeddings", Tooling, "Embeddings").default_on(),
        Feature::new("vision", "Vision", Tooling, "Vision"),
        Feature::new("cognee", "Cognee Memory", Tooling, "Cognee"),
        Feature::new("debate", "Multi-Agent Debate", Orchestration, "Debate"),
        Feature::new("batch", "Batch Execution", Orchestration, "Batch"),
        Feature::new("tool_calling", "Tool Calling", Tooling, "ToolCalling").default_on(),
        Feature::new("multipass", "Multi-Pass Refinement", Orchestration, "Multipass")
            .requires(&["debate"]),
        Feature::new("caching", "Response Caching", Orchestration, "Caching").default_on(),
        Feature::new("rate_limiting", "Rate Limiting", Orchestration, "RateLimiting").default_on(),
        Feature::new("metrics", "Metrics", Observability, "Metrics").default_on(),
        Feature::new("tracing", "Tracing", Observability, "Tracing"),
    ]
}

/// Endpoint path prefixes that force-enable `graphql`/`toon` when
/// `FeatureConfig.openai_endpoint_graphql` is set.
pub const OPENAI_ENDPOINT_PREFIXES: &[&str] = &[
    "/v1/chat/completions",
    "/v1/completions",
    "/v1/embeddings",
    "/v1/models",
    "/v1/files",
    "/v1/images",
    "/v1/audio",
];

/// The "advanced" feature set used by `CapabilityRegistry::full_feature_agents`.
pub const ADVANCED_FEATURES: &[&str] = &["graphql", "toon", "http3", "brotli", "websocket", "debate"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http2_and_http3_conflict_both_ways() {
        let features = default_features();
        let http2 = features.iter().find(|f| f.id == "http2").unwrap();
        let http3 = features.iter().find(|f| f.id == "http3").unwrap();
        assert!(http2.conflicts_with.contains(&"http3".to_string()));
        assert!(http3.conflicts_with.contains(&"http2".to_string()));
    }

    #[test]
    fn multipass_requires_debate() {
        let features = default_features();
        let multipass = features.iter().find(|f| f.id == "multipass").unwrap();
        assert_eq!(multipass.requires, vec!["debate".to_string()]);
    }
}
