//! The layered feature-resolution pipeline: global -> endpoint -> agent ->
//! header -> query. Later layers override earlier ones.

use std::collections::HashMap;

use crate::types::{Error, RequestId, Result};

use super::agent_detect::detect_agent;
use super::capability::{apply_agent_layer, CapabilityRegistry};
use super::config::FeatureConfig;
use super::context::{FeatureContext, ResolutionSource};
use super::feature::OPENAI_ENDPOINT_PREFIXES;
use super::overrides::parse_compact;
use super::registry::FeatureRegistry;

/// Everything the resolver needs about one inbound request. Header/query
/// keys may be any case; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ResolutionInput {
    pub endpoint: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub user_agent: Option<String>,
}

fn header_lookup<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Resolve a `FeatureContext` by composing the five layers in order. Returns
/// a validation error (strict-mode only) describing the first
/// requires/conflicts violation found.
pub fn resolve(
    input: &ResolutionInput,
    feature_registry: &FeatureRegistry,
    capability_registry: &CapabilityRegistry,
    config: &FeatureConfig,
) -> Result<FeatureContext> {
    // Layer 1: global defaults. Baseline is every known feature's registry
    // default, then explicit config overrides on top.
    let mut features: HashMap<String, bool> =
        feature_registry.all().map(|f| (f.id.clone(), f.default_enabled)).collect();
    for (id, enabled) in &config.global_defaults {
        features.insert(id.clone(), *enabled);
    }
    let mut source = ResolutionSource::Global;

    // Layer 2: endpoint defaults.
    if let Some(endpoint_overrides) = config.endpoint_defaults.get(&input.endpoint) {
        for (id, enabled) in endpoint_overrides {
            features.insert(id.clone(), *enabled);
        }
        source = ResolutionSource::Endpoint;
    }
    if config.openai_endpoint_graphql
        && OPENAI_ENDPOINT_PREFIXES.iter().any(|prefix| input.endpoint.starts_with(prefix))
    {
        features.insert("graphql".to_string(), true);
        features.insert("toon".to_string(), true);
        source = ResolutionSource::Endpoint;
    }

    // Layer 3: agent detection.
    let mut detected_agent = None;
    if config.allow_agent_detection {
        if let Some(ua) = &input.user_agent {
            if let Some(agent_name) = detect_agent(ua) {
                if let Some(capability) = capability_registry.get_capability(agent_name) {
                    let layer = apply_agent_layer(capability, feature_registry);
                    features.extend(layer);
                    detected_agent = Some(agent_name.to_string());
                    source = ResolutionSource::Agent;
                }
            }
        }
    }

    // Layer 4: header overrides.
    if config.allow_feature_headers {
        let mut applied = false;
        for feature in feature_registry.all() {
            if let Some(raw) = header_lookup(&input.headers, &feature.header_name) {
                features.insert(feature.id.clone(), super::overrides::parse_bool_token(raw));
                applied = true;
            }
        }
        if let Some(compact) = header_lookup(&input.headers, "X-Features") {
            for (id, enabled) in parse_compact(compact) {
                if feature_registry.contains(&id) {
                    features.insert(id, enabled);
                    applied = true;
                }
            }
        }
        if applied {
            source = ResolutionSource::Header;
        }
    }

    // Layer 5: query overrides.
    if config.allow_feature_query_params {
        let mut applied = false;
        for feature in feature_registry.all() {
            if let Some(raw) = input.query.get(&feature.id) {
                features.insert(feature.id.clone(), super::overrides::parse_bool_token(raw));
                applied = true;
            }
        }
        if let Some(compact) = input.query.get("features") {
            for (id, enabled) in parse_compact(compact) {
                if feature_registry.contains(&id) {
                    features.insert(id, enabled);
                    applied = true;
                }
            }
        }
        if applied {
            source = ResolutionSource::Query;
        }
    }

    let ctx = FeatureContext {
        features,
        detected_agent,
        source,
        endpoint: input.endpoint.clone(),
        request_id: RequestId::new(),
    };

    if config.strict_validation {
        validate(&ctx, feature_registry)?;
    }

    Ok(ctx)
}

/// Strict-mode validation: every enabled feature's `requires` must be
/// enabled and its `conflicts_with` must be disabled. Aborts on the first
/// violation found (features iterated in registry order).
pub fn validate(ctx: &FeatureContext, feature_registry: &FeatureRegistry) -> Result<()> {
    for feature in feature_registry.all() {
        if !ctx.is_enabled(&feature.id) {
            continue;
        }
        for required in &feature.requires {
            if !ctx.is_enabled(required) {
                return Err(Error::validation(format!(
                    "Invalid feature combination: '{}' requires '{}' to be enabled",
                    feature.id, required
                )));
            }
        }
        for conflict in &feature.conflicts_with {
            if ctx.is_enabled(conflict) {
                return Err(Error::validation(format!(
                    "Invalid feature combination: '{}' conflicts with '{}'",
                    feature.id, conflict
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registries() -> (FeatureRegistry, CapabilityRegistry) {
        (FeatureRegistry::default(), CapabilityRegistry::default())
    }

    #[test]
    fn header_override_wins_over_endpoint_default() {
        let (features, capabilities) = registries();
        let mut config = FeatureConfig::default();
        config
            .endpoint_defaults
            .insert("/v1/stream".to_string(), [("graphql".to_string(), true)].into());

        let input = ResolutionInput {
            endpoint: "/v1/stream".to_string(),
            headers: [("X-Feature-GraphQL".to_string(), "false".to_string())].into(),
            query: HashMap::new(),
            user_agent: None,
        };

        let ctx = resolve(&input, &features, &capabilities, &config).unwrap();
        assert!(!ctx.is_enabled("graphql"));
    }

    #[test]
    fn validation_rejects_multipass_without_debate() {
        let (features, capabilities) = registries();
        let mut config = FeatureConfig::default();
        config.global_defaults.insert("multipass".to_string(), true);

        let input = ResolutionInput {
            endpoint: "/x".to_string(),
            ..Default::default()
        };

        let err = resolve(&input, &features, &capabilities, &config).unwrap_err();
        assert!(err.to_string().contains("multipass"));
    }

    #[test]
    fn validation_rejects_http2_and_http3_together() {
        let (features, capabilities) = registries();
        let mut config = FeatureConfig::default();
        config.global_defaults.insert("http3".to_string(), true);
        // http2 defaults on already.

        let input = ResolutionInput { endpoint: "/x".to_string(), ..Default::default() };
        let err = resolve(&input, &features, &capabilities, &config).unwrap_err();
        assert!(err.to_string().contains("conflicts"));
    }

    #[test]
    fn openai_endpoint_force_enables_graphql_and_toon() {
        let (features, capabilities) = registries();
        let mut config = FeatureConfig::default();
        config.openai_endpoint_graphql = true;

        let input = ResolutionInput { endpoint: "/v1/embeddings".to_string(), ..Default::default() };
        let ctx = resolve(&input, &features, &capabilities, &config).unwrap();
        assert!(ctx.is_enabled("graphql"));
        assert!(ctx.is_enabled("toon"));
    }

    #[test]
    fn helixcode_user_agent_enables_advanced_set_and_http3() {
        let (features, capabilities) = registries();
        let config = FeatureConfig::default();

        let input = ResolutionInput {
            endpoint: "/v1/chat/completions".to_string(),
            user_agent: Some("HelixCode/1.0".to_string()),
            ..Default::default()
        };
        let ctx = resolve(&input, &features, &capabilities, &config).unwrap();
        assert_eq!(ctx.detected_agent.as_deref(), Some("helixcode"));
        assert!(ctx.is_enabled("graphql"));
        assert!(ctx.is_enabled("toon"));
        assert_eq!(ctx.transport(), "h3");
    }

    #[test]
    fn query_compact_form_disables_streaming_features() {
        let (features, capabilities) = registries();
        let config = FeatureConfig::default();

        let input = ResolutionInput {
            endpoint: "/stream".to_string(),
            query: [("features".to_string(), "-sse,-websocket".to_string())].into(),
            ..Default::default()
        };
        let ctx = resolve(&input, &features, &capabilities, &config).unwrap();
        assert!(!ctx.is_enabled("sse"));
        assert!(!ctx.is_enabled("websocket"));

        let err = super::super::context::require_any(&ctx, &["websocket", "sse"]).unwrap_err();
        assert_eq!(err.error, "Feature not enabled");
    }

    #[test]
    fn unknown_override_feature_name_is_ignored() {
        let (features, capabilities) = registries();
        let config = FeatureConfig::default();
        let input = ResolutionInput {
            endpoint: "/x".to_string(),
            query: [("features".to_string(), "not_a_real_feature".to_string())].into(),
            ..Default::default()
        };
        // Should not error — unknown names are silently ignored.
        assert!(resolve(&input, &features, &capabilities, &config).is_ok());
    }
}
