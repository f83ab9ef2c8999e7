//! # AgentGate Core - concurrent orchestration core for an AI-agent gateway
//!
//! Four independent subsystems, composed by the caller:
//! - **Event Bus** (`eventbus`) — in-process publish/subscribe with lossy
//!   backpressure and subscriber reaping.
//! - **Feature-Flag Resolution** (`features`) — layered per-request feature
//!   context derived from static tables plus request overrides.
//! - **Provider Registry** (`providers`) — embedding provider lookup with
//!   ordered fallback execution and health checks.
//! - **Formatter Cache & Orchestrator** (`formatters`) — content-addressed
//!   response caching plus a middleware-chained formatting pipeline.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod eventbus;
pub mod features;
pub mod formatters;
pub mod providers;
pub mod types;

pub mod observability;

pub use types::{Config, Error, Result};
