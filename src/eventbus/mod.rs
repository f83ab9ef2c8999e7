//! Event Bus (C1) — in-process publish/subscribe.
//!
//! Per-subscriber bounded queues, lossy delivery under backpressure, and a
//! periodic sweeper that reaps closed subscribers. See `spec.md` §4.1.

mod bus;
mod event;
mod singleton;
mod subscriber;

pub use bus::{EventBus, Subscription};
pub use event::{BusMetrics, BusMetricsSnapshot, Event, ALL_TYPES};
pub use singleton::{emit, emit_async, init, on, reinit};
pub use subscriber::{Filter, TypeSet};
