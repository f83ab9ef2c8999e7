//! Core shared types.
//!
//! Foundational types used across every subsystem:
//! - **IDs**: strongly-typed identifiers (`EventId`, `SubscriberId`, `RequestId`)
//! - **Errors**: the crate-wide error taxonomy
//! - **Config**: per-subsystem configuration, aggregated into `Config`

mod config;
mod errors;
mod ids;

pub use config::{
    Config, EventBusConfig, FormatterCacheConfig, ObservabilityConfig, OrchestratorConfig,
    ProviderRegistryConfig,
};
pub use errors::{Error, Result, StatusHint};
pub use ids::{EventId, RequestId, SubscriberId};
