//! The immutable `Event` value and bus-wide metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::EventId;

/// Wildcard type tag matching every subscription.
pub const ALL_TYPES: &str = "*";

/// An immutable event flowing through the bus.
///
/// Created by publishers, never mutated after publish. Destroyed once every
/// interested subscriber has received or dropped it (Rust's ownership model
/// makes this automatic: the last `Arc`/clone to go out of scope frees it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Dotted namespace, e.g. `provider.health.changed`.
    pub event_type: String,
    pub source: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type: event_type.into(),
            source: source.into(),
            payload,
            created_at: Utc::now(),
            trace_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Monotonic counters tracking bus activity. Read without locking — every
/// field is an independent atomic, matching the "never take a lock to read a
/// counter" design note.
#[derive(Debug, Default)]
pub struct BusMetrics {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    active_subscribers: AtomicU64,
    lifetime_subscribers: AtomicU64,
}

/// Point-in-time snapshot of `BusMetrics`, safe to serialize/log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BusMetricsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub active_subscribers: u64,
    pub lifetime_subscribers: u64,
}

impl BusMetrics {
    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            active_subscribers: self.active_subscribers.load(Ordering::Relaxed),
            lifetime_subscribers: self.lifetime_subscribers.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn inc_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_subscriber_created(&self) {
        self.active_subscribers.fetch_add(1, Ordering::Relaxed);
        self.lifetime_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dec_active_subscriber(&self) {
        self.active_subscribers.fetch_sub(1, Ordering::Relaxed);
    }
}
