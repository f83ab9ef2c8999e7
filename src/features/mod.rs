//! Feature-Flag Resolution Pipeline (C2).
//!
//! Layers a per-request `FeatureContext` from static feature/capability
//! tables plus request-specific overrides. See `resolver::resolve`.

mod agent_detect;
mod capability;
mod config;
mod context;
mod feature;
mod overrides;
mod registry;
mod resolver;

pub use agent_detect::{detect_agent, AGENT_DETECTION_TABLE};
pub use capability::{AgentCapability, CapabilityRegistry, Transport, BASIC_FEATURE_SET};
pub use config::FeatureConfig;
pub use context::{
    require_any, FeatureContext, FeatureNotEnabledError, ResolutionSource, ResolvedHeaders,
};
pub use feature::{Feature, FeatureCategory, ADVANCED_FEATURES, OPENAI_ENDPOINT_PREFIXES};
pub use overrides::{parse_bool_token, parse_compact, parse_compact_item};
pub use registry::FeatureRegistry;
pub use resolver::{resolve, validate, ResolutionInput};
