//! `FeatureConfig` — the request-independent knobs the resolution pipeline
//! reads from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default)]
    pub global_defaults: HashMap<String, bool>,

    #[serde(default)]
    pub endpoint_defaults: HashMap<String, HashMap<String, bool>>,

    #[serde(default = "default_true")]
    pub allow_agent_detection: bool,

    #[serde(default)]
    pub allow_feature_headers: bool,

    #[serde(default)]
    pub allow_feature_query_params: bool,

    #[serde(default)]
    pub strict_validation: bool,

    #[serde(default)]
    pub openai_endpoint_graphql: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            global_defaults: HashMap::new(),
            endpoint_defaults: HashMap::new(),
            allow_agent_detection: true,
            allow_feature_headers: true,
            allow_feature_query_params: true,
            strict_validation: true,
            openai_endpoint_graphql: false,
        }
    }
}
