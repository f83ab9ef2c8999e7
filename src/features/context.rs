//! `FeatureContext` — the per-request resolved feature map and its derived
//! transport/compression/streaming selections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::RequestId;

/// Which layer last changed the resolved map, for diagnostics and for the
/// `X-Agent-Detected` style response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Global,
    Endpoint,
    Agent,
    Header,
    Query,
    /// Set directly by a caller constructing a `FeatureContext` outside the
    /// header/query pipeline (e.g. an internal API call). Not produced by
    /// `resolve()` itself.
    Api,
}

/// Per-request resolved feature state. Frozen once built; discarded at
/// request end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureContext {
    pub features: HashMap<String, bool>,
    pub detected_agent: Option<String>,
    pub source: ResolutionSource,
    pub endpoint: String,
    pub request_id: RequestId,
}

impl FeatureContext {
    pub fn is_enabled(&self, feature: &str) -> bool {
        self.features.get(feature).copied().unwrap_or(false)
    }

    pub fn enabled_features(&self) -> Vec<&str> {
        let mut enabled: Vec<&str> = self
            .features
            .iter()
            .filter(|(_, &v)| v)
            .map(|(k, _)| k.as_str())
            .collect();
        enabled.sort_unstable();
        enabled
    }

    /// `websocket > sse > jsonl`, default `sse`.
    pub fn streaming_method(&self) -> &'static str {
        if self.is_enabled("websocket") {
            "websocket"
        } else if self.is_enabled("sse") {
            "sse"
        } else if self.is_enabled("jsonl") {
            "jsonl"
        } else {
            "sse"
        }
    }

    /// `brotli > zstd > gzip > ""`.
    pub fn compression(&self) -> &'static str {
        if self.is_enabled("brotli") {
            "brotli"
        } else if self.is_enabled("zstd") {
            "zstd"
        } else if self.is_enabled("gzip") {
            "gzip"
        } else {
            ""
        }
    }

    /// `http3 > http2 > http/1.1`, reported in the wire form `X-Transport-Protocol`
    /// uses (`h3`/`h2`), matching `Transport::as_str`.
    pub fn transport(&self) -> &'static str {
        if self.is_enabled("http3") {
            "h3"
        } else if self.is_enabled("http2") {
            "h2"
        } else {
            "http/1.1"
        }
    }

    pub fn resolved_headers(&self) -> ResolvedHeaders {
        let compression = self.compression();
        ResolvedHeaders {
            features_enabled: self.enabled_features().join(","),
            transport: self.transport().to_string(),
            streaming_method: self.streaming_method().to_string(),
            compression_available: if compression.is_empty() { None } else { Some(compression.to_string()) },
            agent_detected: self.detected_agent.clone(),
        }
    }
}

/// The response headers the external HTTP layer SHOULD set, per §4.2 "Side
/// effects on response". This crate never touches an HTTP response type —
/// it hands back plain data for the caller to apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedHeaders {
    pub features_enabled: String,
    pub transport: String,
    pub streaming_method: String,
    pub compression_available: Option<String>,
    pub agent_detected: Option<String>,
}

/// 501-class error body: a feature-gated endpoint was hit without the
/// feature enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureNotEnabledError {
    pub error: &'static str,
    pub feature: Option<String>,
    pub features: Option<Vec<String>>,
    pub message: String,
}

impl FeatureNotEnabledError {
    pub fn single(feature: impl Into<String>) -> Self {
        let feature = feature.into();
        Self {
            error: "Feature not enabled",
            message: format!("feature '{feature}' is not enabled for this request"),
            feature: Some(feature),
            features: None,
        }
    }

    pub fn any_of(features: &[&str]) -> Self {
        Self {
            error: "Feature not enabled",
            message: format!("none of the required features are enabled: {}", features.join(", ")),
            feature: None,
            features: Some(features.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Check whether any of `features` is enabled; otherwise returns the 501
/// body `requireAny` describes.
pub fn require_any(ctx: &FeatureContext, features: &[&str]) -> Result<(), FeatureNotEnabledError> {
    if features.iter().any(|f| ctx.is_enabled(f)) {
        Ok(())
    } else {
        Err(FeatureNotEnabledError::any_of(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(features: &[(&str, bool)]) -> FeatureContext {
        FeatureContext {
            features: features.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            detected_agent: None,
            source: ResolutionSource::Global,
            endpoint: "/test".to_string(),
            request_id: RequestId::new(),
        }
    }

    #[test]
    fn streaming_precedence() {
        assert_eq!(ctx_with(&[("websocket", true), ("sse", true)]).streaming_method(), "websocket");
        assert_eq!(ctx_with(&[("sse", true), ("jsonl", true)]).streaming_method(), "sse");
        assert_eq!(ctx_with(&[("jsonl", true)]).streaming_method(), "jsonl");
        assert_eq!(ctx_with(&[]).streaming_method(), "sse");
    }

    #[test]
    fn compression_precedence() {
        assert_eq!(ctx_with(&[("brotli", true), ("gzip", true)]).compression(), "brotli");
        assert_eq!(ctx_with(&[("zstd", true), ("gzip", true)]).compression(), "zstd");
        assert_eq!(ctx_with(&[("gzip", true)]).compression(), "gzip");
        assert_eq!(ctx_with(&[]).compression(), "");
    }

    #[test]
    fn transport_precedence() {
        assert_eq!(ctx_with(&[("http3", true), ("http2", true)]).transport(), "h3");
        assert_eq!(ctx_with(&[("http2", true)]).transport(), "h2");
        assert_eq!(ctx_with(&[]).transport(), "http/1.1");
    }

    #[test]
    fn require_any_fails_with_all_named() {
        let ctx = ctx_with(&[("sse", false), ("websocket", false)]);
        let err = require_any(&ctx, &["websocket", "sse"]).unwrap_err();
        assert_eq!(err.error, "Feature not enabled");
        assert_eq!(err.features, Some(vec!["websocket".to_string(), "sse".to_string()]));
    }
}
